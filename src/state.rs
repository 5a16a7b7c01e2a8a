use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Idle,
    Capturing,
    Translating,
    Replacing,
}

impl Default for AppStatus {
    fn default() -> Self {
        Self::Idle
    }
}

pub struct AppState {
    pub status: Mutex<AppStatus>,
    pub settings: Mutex<Settings>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self {
            status: Mutex::new(AppStatus::default()),
            settings: Mutex::new(settings),
        }
    }

    pub fn status(&self) -> AppStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Moves `Idle` to `Capturing`. Returns `None` when a cycle is already in flight.
    pub fn try_begin_cycle(self: &Arc<Self>) -> Option<CycleGuard> {
        let mut status = self.status.lock().unwrap_or_else(PoisonError::into_inner);
        if *status != AppStatus::Idle {
            return None;
        }
        *status = AppStatus::Capturing;
        Some(CycleGuard {
            state: Arc::clone(self),
        })
    }
}

/// Marks a translate cycle as in flight; dropping it puts the app back to `Idle`.
pub struct CycleGuard {
    state: Arc<AppState>,
}

impl CycleGuard {
    pub fn advance(&self, next: AppStatus) {
        *self.state.status.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

impl Drop for CycleGuard {
    fn drop(&mut self) {
        *self.state.status.lock().unwrap_or_else(PoisonError::into_inner) = AppStatus::Idle;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub shortcuts: ShortcutSettings,
    pub timing: TimingSettings,
    pub translation: TranslationSettings,
    pub general: GeneralSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShortcutSettings {
    pub translate: String,
    pub restart: String,
}

impl Default for ShortcutSettings {
    fn default() -> Self {
        Self {
            translate: "ctrl+alt+t".to_string(),
            restart: "ctrl+alt+r".to_string(),
        }
    }
}

/// Upper bound for any scaled delay.
pub const MAX_SCALED_DELAY: Duration = Duration::from_secs(10);

/// Delays between synthetic keystrokes and clipboard reads.
///
/// `delay_scale` multiplies the settle and copy delays, so slow target
/// applications can be accommodated with a single knob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub delay_scale: f64,
    pub settle_ms: u64,
    pub copy_ms: u64,
    pub paste_ms: u64,
    /// Upper bound for polling an empty clipboard after the copy keystroke. 0 disables polling.
    pub copy_poll_timeout_ms: u64,
    pub copy_poll_interval_ms: u64,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            delay_scale: 1.0,
            settle_ms: 100,
            copy_ms: 50,
            paste_ms: 10,
            copy_poll_timeout_ms: 200,
            copy_poll_interval_ms: 10,
        }
    }
}

impl TimingSettings {
    /// No delays at all, for an in-memory desktop where keystrokes land synchronously.
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            delay_scale: 0.0,
            settle_ms: 0,
            copy_ms: 0,
            paste_ms: 0,
            copy_poll_timeout_ms: 0,
            copy_poll_interval_ms: 0,
        }
    }

    /// `ms × delay_scale`, capped at [`MAX_SCALED_DELAY`]. A NaN or negative scale means no delay.
    fn scaled(&self, ms: u64) -> Duration {
        let scale = if self.delay_scale.is_finite() && self.delay_scale > 0.0 {
            self.delay_scale
        } else {
            0.0
        };
        Duration::try_from_secs_f64(ms as f64 * scale / 1000.0)
            .map_or(MAX_SCALED_DELAY, |delay| delay.min(MAX_SCALED_DELAY))
    }

    pub fn settle(&self) -> Duration {
        self.scaled(self.settle_ms)
    }

    pub fn copy(&self) -> Duration {
        self.scaled(self.copy_ms)
    }

    pub fn paste(&self) -> Duration {
        Duration::from_millis(self.paste_ms)
    }

    pub fn copy_poll_timeout(&self) -> Duration {
        Duration::from_millis(self.copy_poll_timeout_ms)
    }

    pub fn copy_poll_interval(&self) -> Duration {
        Duration::from_millis(self.copy_poll_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub model: String,
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub request_timeout_secs: u64,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "API_KEY".to_string(),
            request_timeout_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    /// Types " translating..." / " no text copied" into the field during capture.
    pub show_progress_indicator: bool,
    pub restart_script: Option<PathBuf>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: "info".to_string(),
            show_progress_indicator: true,
            restart_script: None,
        }
    }
}
