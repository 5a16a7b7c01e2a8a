mod dispatch;
mod shortcut;

pub use dispatch::Dispatcher;
pub use shortcut::parse_shortcut;

use anyhow::{Context, Result};
use global_hotkey::hotkey::HotKey;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};

use std::sync::PoisonError;

use crate::commands::restart;
use crate::state::ShortcutSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyAction {
    Translate,
    Restart,
}

/// The two parsed global shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HotkeyBindings {
    pub translate: HotKey,
    pub restart: HotKey,
}

impl HotkeyBindings {
    pub fn from_settings(shortcuts: &ShortcutSettings) -> Result<Self> {
        let translate = parse_shortcut(&shortcuts.translate)
            .with_context(|| format!("Invalid translate shortcut '{}'", shortcuts.translate))?;
        let restart = parse_shortcut(&shortcuts.restart)
            .with_context(|| format!("Invalid restart shortcut '{}'", shortcuts.restart))?;
        if translate.id() == restart.id() {
            anyhow::bail!(
                "Translate and restart shortcuts are the same ('{}')",
                shortcuts.translate
            );
        }
        Ok(Self { translate, restart })
    }

    pub fn action_for(&self, id: u32) -> Option<HotkeyAction> {
        if id == self.translate.id() {
            Some(HotkeyAction::Translate)
        } else if id == self.restart.id() {
            Some(HotkeyAction::Restart)
        } else {
            None
        }
    }

    fn all(&self) -> [HotKey; 2] {
        [self.translate, self.restart]
    }
}

/// Owns the OS registration of both shortcuts. Must live on the thread that
/// runs the event loop.
pub struct HotkeyRegistry {
    manager: GlobalHotKeyManager,
    bindings: HotkeyBindings,
}

impl HotkeyRegistry {
    pub fn register(bindings: HotkeyBindings, shortcuts: &ShortcutSettings) -> Result<Self> {
        let manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;

        manager
            .register(bindings.translate)
            .with_context(|| format!("Failed to register hotkey {}", shortcuts.translate))?;
        tracing::info!("Hotkey {} registered for translation", shortcuts.translate);

        manager
            .register(bindings.restart)
            .with_context(|| format!("Failed to register hotkey {}", shortcuts.restart))?;
        tracing::info!("Hotkey {} registered for restart", shortcuts.restart);

        Ok(Self { manager, bindings })
    }

    pub fn unregister_all(&self) {
        match self.manager.unregister_all(&self.bindings.all()) {
            Ok(()) => tracing::debug!("Unregistered all hotkeys"),
            Err(e) => tracing::warn!("Failed to unregister hotkeys: {}", e),
        }
    }
}

pub fn handle_hotkey(dispatcher: &Dispatcher, registry: &HotkeyRegistry, action: HotkeyAction) {
    match action {
        HotkeyAction::Translate => {
            dispatcher.trigger_translate();
        }
        HotkeyAction::Restart => {
            if !dispatcher.can_restart() {
                return;
            }
            let general = dispatcher
                .state()
                .settings
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .general
                .clone();
            restart::restart(registry, &general)
        }
    }
}

/// Forwards key presses of the bound shortcuts to `on_action` from a
/// dedicated thread, so the OS delivery thread never waits on a cycle.
pub fn spawn_listener<F>(bindings: HotkeyBindings, on_action: F) -> Result<std::thread::JoinHandle<()>>
where
    F: Fn(HotkeyAction) + Send + 'static,
{
    std::thread::Builder::new()
        .name("hotkey-listener".into())
        .spawn(move || {
            let receiver = GlobalHotKeyEvent::receiver();
            while let Ok(event) = receiver.recv() {
                // Only act on key press, ignore release
                if !matches!(event.state, HotKeyState::Pressed) {
                    continue;
                }
                if let Some(action) = bindings.action_for(event.id) {
                    on_action(action);
                }
            }
            tracing::debug!("Hotkey event channel closed");
        })
        .context("Failed to spawn hotkey listener")
}
