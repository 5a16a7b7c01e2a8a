//! In-memory desktop for tests: one clipboard slot and one focused text field.

use std::sync::{Mutex, PoisonError};
use anyhow::Result;
use super::{ClipboardSlot, EditChord, KeyInjector};

#[derive(Debug, Default)]
struct Desktop {
    clipboard: String,
    field: String,
    selected: bool,
    copy_ignored: bool,
    copy_lag: usize,
    pending_copy: Option<(String, usize)>,
    fail_on: Option<EditChord>,
    chords: Vec<EditChord>,
}

#[derive(Debug, Default)]
pub struct FakeDesktop {
    inner: Mutex<Desktop>,
}

impl FakeDesktop {
    pub fn new(clipboard: &str, field: &str) -> Self {
        Self {
            inner: Mutex::new(Desktop {
                clipboard: clipboard.to_string(),
                field: field.to_string(),
                ..Desktop::default()
            }),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut Desktop) -> R) -> R {
        f(&mut self.inner.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// The copy chord is swallowed, like an application that reacts too slowly.
    pub fn ignore_copy(&self) {
        self.with(|d| d.copy_ignored = true);
    }

    /// The copied text reaches the clipboard only after `reads` further clipboard reads.
    pub fn late_copy(&self, reads: usize) {
        self.with(|d| d.copy_lag = reads);
    }

    pub fn fail_on(&self, chord: EditChord) {
        self.with(|d| d.fail_on = Some(chord));
    }

    pub fn clipboard(&self) -> String {
        self.with(|d| d.clipboard.clone())
    }

    pub fn field(&self) -> String {
        self.with(|d| d.field.clone())
    }

    pub fn set_field(&self, text: &str) {
        self.with(|d| {
            d.field = text.to_string();
            d.selected = false;
        });
    }

    pub fn chords(&self) -> Vec<EditChord> {
        self.with(|d| d.chords.clone())
    }
}

impl ClipboardSlot for FakeDesktop {
    fn read(&self) -> Result<String> {
        Ok(self.with(|d| {
            if let Some((text, left)) = d.pending_copy.take() {
                if left == 0 {
                    d.clipboard = text;
                } else {
                    d.pending_copy = Some((text, left - 1));
                }
            }
            d.clipboard.clone()
        }))
    }

    fn write(&self, text: &str) -> Result<()> {
        self.with(|d| {
            d.pending_copy = None;
            d.clipboard = text.to_string();
        });
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.with(|d| d.clipboard.clear());
        Ok(())
    }
}

impl KeyInjector for FakeDesktop {
    fn press(&self, chord: EditChord) -> Result<()> {
        self.with(|d| {
            d.chords.push(chord);
            if d.fail_on == Some(chord) {
                anyhow::bail!("injected failure on {:?}", chord);
            }
            match chord {
                EditChord::SelectAll => d.selected = true,
                EditChord::Copy => {
                    if d.selected && !d.copy_ignored {
                        if d.copy_lag == 0 {
                            d.clipboard = d.field.clone();
                        } else {
                            d.pending_copy = Some((d.field.clone(), d.copy_lag));
                        }
                    }
                }
                EditChord::Paste => {
                    if d.selected {
                        d.field = d.clipboard.clone();
                    } else {
                        d.field.push_str(&d.clipboard);
                    }
                    d.selected = false;
                }
            }
            Ok(())
        })
    }

    fn type_text(&self, text: &str) -> Result<()> {
        self.with(|d| {
            if d.selected {
                d.field = text.to_string();
            } else {
                d.field.push_str(text);
            }
            d.selected = false;
        });
        Ok(())
    }
}
