// Jumper platform paths for Linux
// Config: ~/.config/jumper
// Data:   ~/.local/share/jumper

use std::env;
use std::path::PathBuf;

fn resolve(xdg: Option<String>, home: Option<String>, fallback: &[&str]) -> PathBuf {
    match xdg {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir).join("jumper"),
        _ => {
            let mut path = PathBuf::from(home.unwrap_or_else(|| String::from("/tmp")));
            for part in fallback {
                path.push(part);
            }
            path.join("jumper")
        }
    }
}

/// `$XDG_CONFIG_HOME/jumper` if set, otherwise `~/.config/jumper`.
pub fn get_config_dir() -> PathBuf {
    resolve(env::var("XDG_CONFIG_HOME").ok(), env::var("HOME").ok(), &[".config"])
}

/// `$XDG_DATA_HOME/jumper` if set, otherwise `~/.local/share/jumper`.
pub fn get_data_dir() -> PathBuf {
    resolve(env::var("XDG_DATA_HOME").ok(), env::var("HOME").ok(), &[".local", "share"])
}
