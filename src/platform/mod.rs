// Jumper platform abstraction
// Provides platform-specific paths and key-binding conventions.
//
// Uses `cfg(target_os)` for conditional compilation to select the correct
// platform-specific implementation at compile time.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Keyboard convention family. Only macOS binds view cycling differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Mac,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }

    pub fn is_mac(self) -> bool {
        self == Platform::Mac
    }
}

/// Returns the platform-specific configuration directory for jumper.
///
/// - **Linux**: `~/.config/jumper` (or `$XDG_CONFIG_HOME/jumper`)
/// - **macOS**: `~/Library/Application Support/Jumper`
/// - **Windows**: `%APPDATA%/Jumper`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory for jumper.
///
/// - **Linux**: `~/.local/share/jumper` (or `$XDG_DATA_HOME/jumper`)
/// - **macOS**: `~/Library/Application Support/Jumper`
/// - **Windows**: `%APPDATA%/Jumper`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
