use anyhow::{Context, Result};
use tokio::time::sleep;

use crate::platform::{ClipboardSlot, EditChord, KeyInjector};
use crate::state::TimingSettings;

/// Replaces the whole content of the focused field with `text` by pasting it.
/// Leaves `text` on the clipboard.
pub async fn replace_selection(
    clipboard: &dyn ClipboardSlot,
    keys: &dyn KeyInjector,
    timing: &TimingSettings,
    text: &str,
) -> Result<()> {
    clipboard.write(text).context("Failed to put translation on clipboard")?;
    tracing::debug!("Copied text to clipboard");

    keys.press(EditChord::SelectAll)?;
    sleep(timing.paste()).await;
    keys.press(EditChord::Paste)?;
    tracing::debug!("Replaced selected text");
    Ok(())
}
