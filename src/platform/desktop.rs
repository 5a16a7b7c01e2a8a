use std::sync::{Mutex, PoisonError};
use anyhow::{Context, Result};
use enigo::{Direction, Enigo, Key, Keyboard};
use super::{ClipboardSlot, EditChord, KeyInjector};

#[cfg(target_os = "macos")]
const EDIT_MODIFIER: Key = Key::Meta;
#[cfg(not(target_os = "macos"))]
const EDIT_MODIFIER: Key = Key::Control;

/// arboard-backed clipboard. One handle is kept for the process lifetime:
/// on X11 the owning handle serves the selection, so dropping it would lose
/// whatever was just written.
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let clipboard = arboard::Clipboard::new().context("Failed to open the system clipboard")?;
        Ok(Self {
            inner: Mutex::new(clipboard),
        })
    }
}

impl ClipboardSlot for SystemClipboard {
    fn read(&self) -> Result<String> {
        let mut clipboard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match clipboard.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(e) => Err(e).context("Failed to read clipboard text"),
        }
    }

    fn write(&self, text: &str) -> Result<()> {
        let mut clipboard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        clipboard
            .set_text(text)
            .context("Failed to write clipboard text")
    }

    fn clear(&self) -> Result<()> {
        let mut clipboard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        clipboard.clear().context("Failed to clear the clipboard")
    }
}

/// Synthesizes keystrokes with enigo. A fresh `Enigo` is created per call so no
/// virtual keyboard stays open between cycles.
pub struct EnigoKeyInjector;

impl EnigoKeyInjector {
    pub fn new() -> Self {
        Self
    }

    fn connect() -> Result<Enigo> {
        Enigo::new(&enigo::Settings::default())
            .context("Failed to initialize keyboard injection")
    }
}

impl Default for EnigoKeyInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyInjector for EnigoKeyInjector {
    fn press(&self, chord: EditChord) -> Result<()> {
        let mut enigo = Self::connect()?;
        enigo
            .key(EDIT_MODIFIER, Direction::Press)
            .context("Failed to press modifier")?;
        let clicked = enigo.key(Key::Unicode(chord.key()), Direction::Click);
        // Release even when the click failed.
        let released = enigo.key(EDIT_MODIFIER, Direction::Release);
        clicked.with_context(|| format!("Failed to send {:?}", chord))?;
        released.context("Failed to release modifier")?;
        tracing::debug!("Sent {:?}", chord);
        Ok(())
    }

    fn type_text(&self, text: &str) -> Result<()> {
        let mut enigo = Self::connect()?;
        enigo.text(text).context("Failed to type text")?;
        Ok(())
    }
}
