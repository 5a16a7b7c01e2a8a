use std::path::Path;
use std::process::{Command, Stdio};
use anyhow::{Context, Result};

use crate::hotkey::HotkeyRegistry;
use crate::state::GeneralSettings;

/// Unregisters the hotkeys, launches a fresh instance through the helper and
/// exits the current process.
pub fn restart(registry: &HotkeyRegistry, general: &GeneralSettings) -> ! {
    tracing::info!("Restart hotkey triggered");
    registry.unregister_all();

    match restart_command(general).and_then(|mut command| {
        command
            .spawn()
            .with_context(|| format!("Failed to launch {:?}", command.get_program()))
    }) {
        Ok(child) => tracing::info!("Restart helper launched (pid {}); exiting for restart", child.id()),
        Err(e) => tracing::error!("Failed to restart: {:#}", e),
    }

    tracing::info!("Input translation daemon stopped");
    std::process::exit(0)
}

/// The detached command that brings the daemon back up.
pub fn restart_command(general: &GeneralSettings) -> Result<Command> {
    let mut command = match &general.restart_script {
        Some(script) => script_command(script),
        None => {
            let exe = std::env::current_exe().context("Failed to locate the running executable")?;
            let mut command = Command::new(exe);
            command.args(std::env::args_os().skip(1));
            command
        }
    };
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    detach(&mut command);
    Ok(command)
}

#[cfg(windows)]
fn script_command(script: &Path) -> Command {
    let mut command = Command::new("powershell");
    command
        .args(["-NoProfile", "-ExecutionPolicy", "Bypass", "-File"])
        .arg(script);
    command
}

#[cfg(not(windows))]
fn script_command(script: &Path) -> Command {
    let mut command = Command::new("sh");
    command.arg(script);
    command
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    const DETACHED_PROCESS: u32 = 0x0000_0008;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    command.creation_flags(DETACHED_PROCESS | CREATE_NO_WINDOW);
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(any(windows, unix)))]
fn detach(_command: &mut Command) {}
