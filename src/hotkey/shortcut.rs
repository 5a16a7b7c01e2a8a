use std::str::FromStr;
use anyhow::{bail, Result};
use global_hotkey::hotkey::{Code, HotKey, Modifiers};

/// Parses a binding such as `ctrl+alt+t` or `Shift+F9`.
///
/// Modifier and key names are case-insensitive. The last segment is the key;
/// everything before it must be a modifier.
pub fn parse_shortcut(input: &str) -> Result<HotKey> {
    let parts: Vec<&str> = input
        .split('+')
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect();

    let Some((key_part, modifier_parts)) = parts.split_last() else {
        bail!("Shortcut is empty");
    };

    let mut modifiers = Modifiers::empty();
    for modifier in modifier_parts {
        match modifier.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => modifiers |= Modifiers::CONTROL,
            "alt" | "option" => modifiers |= Modifiers::ALT,
            "shift" => modifiers |= Modifiers::SHIFT,
            "cmd" | "command" | "meta" | "super" | "win" => modifiers |= Modifiers::SUPER,
            other => bail!("Unknown modifier '{}' in shortcut '{}'", other, input),
        }
    }

    let code = parse_code(key_part)?;
    let modifiers = if modifiers.is_empty() { None } else { Some(modifiers) };
    Ok(HotKey::new(modifiers, code))
}

fn parse_code(key: &str) -> Result<Code> {
    let normalized = match key.to_ascii_lowercase().as_str() {
        "esc" | "escape" => "Escape".to_string(),
        "space" => "Space".to_string(),
        "enter" | "return" => "Enter".to_string(),
        "tab" => "Tab".to_string(),
        "backspace" => "Backspace".to_string(),
        "delete" | "del" => "Delete".to_string(),
        "insert" | "ins" => "Insert".to_string(),
        "home" => "Home".to_string(),
        "end" => "End".to_string(),
        "pageup" => "PageUp".to_string(),
        "pagedown" => "PageDown".to_string(),
        "up" | "arrowup" => "ArrowUp".to_string(),
        "down" | "arrowdown" => "ArrowDown".to_string(),
        "left" | "arrowleft" => "ArrowLeft".to_string(),
        "right" | "arrowright" => "ArrowRight".to_string(),
        "-" | "minus" => "Minus".to_string(),
        "=" | "equal" => "Equal".to_string(),
        "," | "comma" => "Comma".to_string(),
        "." | "period" => "Period".to_string(),
        "/" | "slash" => "Slash".to_string(),
        ";" | "semicolon" => "Semicolon".to_string(),
        "'" | "quote" => "Quote".to_string(),
        "`" | "backquote" => "Backquote".to_string(),
        lower if lower.len() == 1 => {
            let ch = lower.chars().next().unwrap_or_default();
            if ch.is_ascii_alphabetic() {
                format!("Key{}", ch.to_ascii_uppercase())
            } else if ch.is_ascii_digit() {
                format!("Digit{}", ch)
            } else {
                bail!("Unsupported shortcut key '{}'", key);
            }
        }
        lower if lower.starts_with('f') && lower[1..].parse::<u8>().is_ok_and(|n| (1..=24).contains(&n)) => {
            lower.to_ascii_uppercase()
        }
        _ => bail!("Unsupported shortcut key '{}'", key),
    };

    Code::from_str(&normalized).map_err(|_| anyhow::anyhow!("Unsupported shortcut key '{}'", key))
}
