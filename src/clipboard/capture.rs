use anyhow::{Context, Result};
use tokio::time::{sleep, Instant};

use super::ClipboardSnapshot;
use crate::platform::{ClipboardSlot, EditChord, KeyInjector};
use crate::state::TimingSettings;

const INDICATOR_TRANSLATING: &str = " translating...";
const INDICATOR_NOTHING_COPIED: &str = " no text copied";

/// Copies the text of the focused field through the clipboard and returns it
/// trimmed. The previous clipboard content is restored before returning,
/// whatever the outcome. An empty string means nothing was selected.
pub async fn capture_selection(
    clipboard: &dyn ClipboardSlot,
    keys: &dyn KeyInjector,
    timing: &TimingSettings,
    show_indicator: bool,
) -> Result<String> {
    // Modifiers of the trigger chord may still be held.
    sleep(timing.settle()).await;
    tracing::debug!("Starting safe copy");

    let _snapshot = ClipboardSnapshot::take(clipboard)?;
    clipboard.clear().context("Failed to clear clipboard")?;
    tracing::debug!("Clipboard cleared");

    keys.press(EditChord::SelectAll)?;
    tracing::debug!("Sent select-all");
    sleep(timing.copy()).await;

    keys.press(EditChord::Copy)?;
    tracing::debug!("Sent copy");
    sleep(timing.copy()).await;

    let copied = read_copied(clipboard, timing).await?;
    tracing::debug!("Clipboard content retrieved ({} chars)", copied.chars().count());

    if show_indicator {
        let indicator = if copied.is_empty() {
            INDICATOR_NOTHING_COPIED
        } else {
            INDICATOR_TRANSLATING
        };
        if let Err(e) = keys.type_text(indicator) {
            tracing::warn!("Failed to type progress indicator: {:#}", e);
        }
    }

    Ok(copied)
}

/// Reads the copy result, polling while the clipboard is still empty until
/// the configured timeout elapses.
async fn read_copied(clipboard: &dyn ClipboardSlot, timing: &TimingSettings) -> Result<String> {
    let deadline = Instant::now() + timing.copy_poll_timeout();
    let mut copied = clipboard.read().context("Failed to read copied text")?;
    while copied.trim().is_empty() && Instant::now() < deadline {
        sleep(timing.copy_poll_interval()).await;
        copied = clipboard.read().context("Failed to read copied text")?;
    }
    Ok(copied.trim().to_string())
}
