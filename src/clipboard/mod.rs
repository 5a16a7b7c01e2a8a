mod capture;
mod replace;

pub use capture::capture_selection;
pub use replace::replace_selection;

use anyhow::{Context, Result};
use crate::platform::ClipboardSlot;

/// Clipboard content taken at the start of a destructive sequence. Dropping
/// the snapshot writes the content back, on success, error and unwind alike.
pub struct ClipboardSnapshot<'a> {
    slot: &'a dyn ClipboardSlot,
    original: String,
}

impl<'a> ClipboardSnapshot<'a> {
    pub fn take(slot: &'a dyn ClipboardSlot) -> Result<Self> {
        let original = slot.read().context("Failed to capture original clipboard")?;
        tracing::debug!("Captured original clipboard ({} chars)", original.chars().count());
        Ok(Self { slot, original })
    }
}

impl Drop for ClipboardSnapshot<'_> {
    fn drop(&mut self) {
        match self.slot.write(&self.original) {
            Ok(()) => tracing::debug!("Restored original clipboard"),
            Err(e) => tracing::error!("Failed to restore original clipboard: {:#}", e),
        }
    }
}
