mod clipboard;
mod commands;
mod hotkey;
mod logging;
mod persistence;
mod platform;
mod state;
mod translate;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use winit::event::Event;
use winit::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};

use commands::translate::TranslatePipeline;
use hotkey::{Dispatcher, HotkeyAction, HotkeyBindings, HotkeyRegistry};
use state::{AppState, Settings};
use translate::{OpenAiConfig, OpenAiTranslator};

#[derive(Debug)]
enum DaemonEvent {
    Hotkey(HotkeyAction),
    Shutdown,
}

pub fn run() {
    let dotenv = dotenvy::dotenv();

    let settings_path = persistence::settings_path();
    let loaded = settings_path
        .as_ref()
        .map_err(|e| anyhow::anyhow!("{:#}", e))
        .and_then(|path| persistence::load_settings(path));
    let settings = loaded.as_ref().cloned().unwrap_or_default();

    match logging::init(&settings.general) {
        Ok(path) => eprintln!("Logging to {}", path.display()),
        Err(e) => {
            eprintln!("Failed to set up logging: {:#}", e);
            std::process::exit(1);
        }
    }

    tracing::info!("Starting input translation daemon v{}...", env!("CARGO_PKG_VERSION"));
    match (&loaded, &settings_path) {
        (Ok(_), Ok(path)) => tracing::info!("Settings loaded from {}", path.display()),
        (Err(e), _) => tracing::warn!("Failed to load settings: {:#}. Using defaults.", e),
        _ => {}
    }
    if let Some(warning) = dotenv_warning(&dotenv) {
        tracing::warn!("{}", warning);
    }
    tracing::info!("Press {} to translate selected text", settings.shortcuts.translate);
    tracing::info!("Press {} to restart the daemon", settings.shortcuts.restart);
    tracing::debug!("Logger level set to {}", settings.general.log_level);

    let api_key_env = &settings.translation.api_key_env;
    let Some(api_key) = translate::api_key_from_env(api_key_env) else {
        tracing::error!("Missing {} in environment or .env; exiting", api_key_env);
        std::process::exit(1);
    };

    let code = match run_daemon(settings, api_key) {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("Daemon error: {:#}", e);
            1
        }
    };
    tracing::info!("Input translation daemon stopped");
    std::process::exit(code);
}

/// A missing .env is fine, the key may come from the real environment. Anything
/// else (unreadable file, bad line) is worth a warning.
fn dotenv_warning(result: &dotenvy::Result<std::path::PathBuf>) -> Option<String> {
    match result {
        Ok(_) => None,
        Err(e) if e.not_found() => None,
        Err(e) => Some(format!("Failed to load .env: {}", e)),
    }
}

fn run_daemon(settings: Settings, api_key: String) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("translate-worker")
        .build()
        .context("Failed to start async runtime")?;

    tracing::debug!("Initializing translation client for model {}", settings.translation.model);
    let translator = OpenAiTranslator::new(OpenAiConfig::from_settings(&settings.translation, api_key))?;
    let pipeline = TranslatePipeline::new(
        platform::get_clipboard()?,
        platform::get_key_injector(),
        Arc::new(translator),
        settings.timing.clone(),
        settings.general.show_progress_indicator,
    );
    let shortcuts = settings.shortcuts.clone();
    let bindings = HotkeyBindings::from_settings(&shortcuts)?;
    let state = Arc::new(AppState::new(settings));
    let dispatcher = Dispatcher::new(state, Arc::new(pipeline), runtime.handle().clone());

    let event_loop = build_event_loop()?;
    let registry = HotkeyRegistry::register(bindings, &shortcuts)?;

    let hotkey_proxy = event_loop.create_proxy();
    hotkey::spawn_listener(bindings, move |action| {
        let _ = hotkey_proxy.send_event(DaemonEvent::Hotkey(action));
    })?;

    let shutdown_proxy = event_loop.create_proxy();
    ctrlc::set_handler(move || {
        let _ = shutdown_proxy.send_event(DaemonEvent::Shutdown);
    })
    .context("Failed to install Ctrl-C handler")?;

    tracing::debug!("Awaiting hotkey activations");
    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);
            match event {
                Event::UserEvent(DaemonEvent::Hotkey(action)) => {
                    hotkey::handle_hotkey(&dispatcher, &registry, action);
                }
                Event::UserEvent(DaemonEvent::Shutdown) => {
                    tracing::info!("Shutdown requested by user");
                    elwt.exit();
                }
                _ => {}
            }
        })
        .context("Event loop failed")?;

    runtime.shutdown_timeout(Duration::from_secs(1));
    Ok(())
}

fn build_event_loop() -> Result<EventLoop<DaemonEvent>> {
    let mut builder = EventLoopBuilder::<DaemonEvent>::with_user_event();
    #[cfg(target_os = "macos")]
    {
        use winit::platform::macos::{ActivationPolicy, EventLoopBuilderExtMacOS};
        // Background utility: no Dock icon, no menu bar.
        builder.with_activation_policy(ActivationPolicy::Accessory);
    }
    builder.build().context("Failed to create event loop")
}
