//! Shortcut Manager for the jumper overlay.
//!
//! Maps key chords to navigation commands with conflict detection and
//! platform adaptation (view cycling uses Alt+Tab on macOS).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::platform::Platform;
use crate::types::errors::ShortcutError;

/// Everything a key chord can trigger inside the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    NextView,
    PreviousView,
    OpenCreateViewMenu,
    FocusNext,
    FocusPrevious,
    ExtendNext,
    ExtendPrevious,
    Submit,
    Dismiss,
    ToggleSelection,
}

impl Command {
    pub const ALL: [Command; 10] = [
        Command::NextView,
        Command::PreviousView,
        Command::OpenCreateViewMenu,
        Command::FocusNext,
        Command::FocusPrevious,
        Command::ExtendNext,
        Command::ExtendPrevious,
        Command::Submit,
        Command::Dismiss,
        Command::ToggleSelection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Command::NextView => "next_view",
            Command::PreviousView => "previous_view",
            Command::OpenCreateViewMenu => "open_create_view_menu",
            Command::FocusNext => "focus_next",
            Command::FocusPrevious => "focus_previous",
            Command::ExtendNext => "extend_next",
            Command::ExtendPrevious => "extend_previous",
            Command::Submit => "submit",
            Command::Dismiss => "dismiss",
            Command::ToggleSelection => "toggle_selection",
        }
    }
}

const MODIFIER_ORDER: [&str; 4] = ["Ctrl", "Alt", "Shift", "Cmd"];

/// Puts modifiers in canonical order so "Shift+Alt+Tab" and "Alt+Shift+Tab"
/// compare equal. Single-letter keys are upper-cased.
pub fn normalize_keys(keys: &str) -> Result<String, ShortcutError> {
    let parts: Vec<&str> = keys.split('+').map(str::trim).collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(ShortcutError::InvalidKeys(keys.to_string()));
    }
    let Some((key, modifiers)) = parts.split_last() else {
        return Err(ShortcutError::InvalidKeys(keys.to_string()));
    };
    if MODIFIER_ORDER.iter().any(|m| m.eq_ignore_ascii_case(key)) {
        return Err(ShortcutError::InvalidKeys(keys.to_string()));
    }

    let mut ordered = Vec::with_capacity(parts.len());
    for modifier in MODIFIER_ORDER {
        if modifiers.iter().any(|m| m.eq_ignore_ascii_case(modifier)) {
            ordered.push(modifier.to_string());
        }
    }
    if ordered.len() != modifiers.len() {
        return Err(ShortcutError::InvalidKeys(keys.to_string()));
    }

    if key.chars().count() == 1 {
        ordered.push(key.to_uppercase());
    } else {
        ordered.push(key.to_string());
    }
    Ok(ordered.join("+"))
}

/// Trait defining shortcut management operations.
pub trait ShortcutManagerTrait {
    fn register_shortcut(&mut self, command: Command, keys: &str) -> Result<(), ShortcutError>;
    fn unregister_shortcut(&mut self, command: Command) -> Result<(), ShortcutError>;
    fn get_shortcut(&self, command: Command) -> Option<&str>;
    fn list_shortcuts(&self) -> &HashMap<Command, String>;
    fn reset_to_defaults(&mut self);
    fn has_conflict(&self, keys: &str, exclude: Option<Command>) -> Option<Command>;
    fn get_default_shortcuts(&self) -> HashMap<Command, String>;
    fn resolve(&self, keys: &str) -> Option<Command>;
}

/// Shortcut manager with in-memory storage and platform adaptation.
pub struct ShortcutManager {
    platform: Platform,
    shortcuts: HashMap<Command, String>,
}

impl ShortcutManager {
    pub fn new() -> Self {
        Self::with_platform(Platform::current())
    }

    pub fn with_platform(platform: Platform) -> Self {
        let mut mgr = Self {
            platform,
            shortcuts: HashMap::new(),
        };
        mgr.shortcuts = mgr.get_default_shortcuts();
        mgr
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }
}

impl Default for ShortcutManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutManagerTrait for ShortcutManager {
    fn register_shortcut(&mut self, command: Command, keys: &str) -> Result<(), ShortcutError> {
        if keys.trim().is_empty() {
            return Err(ShortcutError::InvalidKeys("Keys cannot be empty".to_string()));
        }
        let normalized = normalize_keys(keys)?;

        if let Some(conflicting) = self.has_conflict(&normalized, Some(command)) {
            return Err(ShortcutError::Conflict(format!(
                "'{}' is already bound to '{}'",
                normalized,
                conflicting.as_str()
            )));
        }

        self.shortcuts.insert(command, normalized);
        Ok(())
    }

    fn unregister_shortcut(&mut self, command: Command) -> Result<(), ShortcutError> {
        self.shortcuts
            .remove(&command)
            .map(|_| ())
            .ok_or_else(|| ShortcutError::NotFound(command.as_str().to_string()))
    }

    fn get_shortcut(&self, command: Command) -> Option<&str> {
        self.shortcuts.get(&command).map(|s| s.as_str())
    }

    fn list_shortcuts(&self) -> &HashMap<Command, String> {
        &self.shortcuts
    }

    fn reset_to_defaults(&mut self) {
        self.shortcuts = self.get_default_shortcuts();
    }

    fn has_conflict(&self, keys: &str, exclude: Option<Command>) -> Option<Command> {
        let normalized = normalize_keys(keys).ok()?;
        self.shortcuts
            .iter()
            .find(|(command, bound)| Some(**command) != exclude && **bound == normalized)
            .map(|(command, _)| *command)
    }

    fn get_default_shortcuts(&self) -> HashMap<Command, String> {
        let (next_view, previous_view) = if self.platform.is_mac() {
            ("Alt+Tab", "Alt+Shift+Tab")
        } else {
            ("Ctrl+ArrowRight", "Ctrl+ArrowLeft")
        };

        let defaults = [
            (Command::NextView, next_view),
            (Command::PreviousView, previous_view),
            (Command::OpenCreateViewMenu, "N"),
            (Command::FocusNext, "ArrowDown"),
            (Command::FocusPrevious, "ArrowUp"),
            (Command::ExtendNext, "Shift+ArrowDown"),
            (Command::ExtendPrevious, "Shift+ArrowUp"),
            (Command::Submit, "Enter"),
            (Command::Dismiss, "Escape"),
            (Command::ToggleSelection, "Space"),
        ];

        defaults
            .into_iter()
            .map(|(command, keys)| (command, keys.to_string()))
            .collect()
    }

    /// Command bound to a pressed chord, if any.
    fn resolve(&self, keys: &str) -> Option<Command> {
        let normalized = normalize_keys(keys).ok()?;
        self.shortcuts
            .iter()
            .find(|(_, bound)| **bound == normalized)
            .map(|(command, _)| *command)
    }
}
