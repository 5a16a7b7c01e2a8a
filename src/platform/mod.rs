mod desktop;
#[cfg(test)]
pub mod fake;

pub use desktop::{EnigoKeyInjector, SystemClipboard};

use std::sync::Arc;
use anyhow::Result;

/// The system clipboard seen as a single text slot. Last writer wins.
pub trait ClipboardSlot: Send + Sync {
    /// Current text content; an empty or non-text clipboard reads as `""`.
    fn read(&self) -> Result<String>;
    fn write(&self, text: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Editing chords synthesized into the focused application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditChord {
    SelectAll,
    Copy,
    Paste,
}

impl EditChord {
    pub fn key(self) -> char {
        match self {
            Self::SelectAll => 'a',
            Self::Copy => 'c',
            Self::Paste => 'v',
        }
    }
}

pub trait KeyInjector: Send + Sync {
    fn press(&self, chord: EditChord) -> Result<()>;
    fn type_text(&self, text: &str) -> Result<()>;
}

pub fn get_clipboard() -> Result<Arc<dyn ClipboardSlot>> {
    Ok(Arc::new(SystemClipboard::new()?))
}

pub fn get_key_injector() -> Arc<dyn KeyInjector> {
    Arc::new(EnigoKeyInjector::new())
}
