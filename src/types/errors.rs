use std::fmt;

// === ViewerError ===

/// Errors raised by the viewer store (views, saved objects, viewer settings).
#[derive(Debug)]
pub enum ViewerError {
    /// View with the given ID was not found.
    NotFound(String),
    /// A view with the same tag or source filter already exists.
    DuplicateView(String),
    /// The view cannot be created or removed (e.g. a default view).
    InvalidView(String),
    /// Database operation failed.
    DatabaseError(String),
    /// Failed to serialize or deserialize the persisted viewer state.
    SerializationError(String),
    /// The remote service rejected a save.
    SaveFailed(String),
}

impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::NotFound(id) => write!(f, "View not found: {}", id),
            ViewerError::DuplicateView(name) => write!(f, "View already exists: {}", name),
            ViewerError::InvalidView(msg) => write!(f, "Invalid view: {}", msg),
            ViewerError::DatabaseError(msg) => write!(f, "Viewer database error: {}", msg),
            ViewerError::SerializationError(msg) => {
                write!(f, "Viewer serialization error: {}", msg)
            }
            ViewerError::SaveFailed(url) => write!(f, "Failed to save link: {}", url),
        }
    }
}

impl std::error::Error for ViewerError {}

// === FeedError ===

/// Errors produced while fetching feed content (history pages, view feeds).
#[derive(Debug)]
pub enum FeedError {
    /// The collaborator failed to deliver the requested page.
    FetchFailed(String),
    /// No source is available for the requested feed.
    Unavailable(String),
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::FetchFailed(msg) => write!(f, "Feed fetch failed: {}", msg),
            FeedError::Unavailable(what) => write!(f, "Feed unavailable: {}", what),
        }
    }
}

impl std::error::Error for FeedError {}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    IoError(String),
    /// Failed to serialize or deserialize settings.
    SerializationError(String),
    /// The provided settings key is invalid.
    InvalidKey(String),
    /// The provided settings value is invalid.
    InvalidValue(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::IoError(msg) => write!(f, "Settings I/O error: {}", msg),
            SettingsError::SerializationError(msg) => {
                write!(f, "Settings serialization error: {}", msg)
            }
            SettingsError::InvalidKey(key) => write!(f, "Invalid settings key: {}", key),
            SettingsError::InvalidValue(msg) => {
                write!(f, "Invalid settings value: {}", msg)
            }
        }
    }
}

impl std::error::Error for SettingsError {}

// === ShortcutError ===

/// Errors related to keyboard shortcut management.
#[derive(Debug)]
pub enum ShortcutError {
    /// Shortcut for the given command was not found.
    NotFound(String),
    /// The shortcut keys conflict with an existing binding.
    Conflict(String),
    /// The provided key combination is invalid.
    InvalidKeys(String),
}

impl fmt::Display for ShortcutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortcutError::NotFound(command) => {
                write!(f, "Shortcut not found for command: {}", command)
            }
            ShortcutError::Conflict(msg) => write!(f, "Shortcut conflict: {}", msg),
            ShortcutError::InvalidKeys(keys) => write!(f, "Invalid shortcut keys: {}", keys),
        }
    }
}

impl std::error::Error for ShortcutError {}

// === MessageError ===

/// Errors on the typed message channel between the host and the background state.
#[derive(Debug)]
pub enum MessageError {
    /// The receiving side of the channel has shut down.
    ChannelClosed,
    /// The handler dropped the reply sender without answering.
    NoReply,
    /// The request could not be decoded into a known message.
    InvalidRequest(String),
    /// The handler answered with an error.
    HandlerFailed(String),
}

impl fmt::Display for MessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageError::ChannelClosed => write!(f, "Message channel closed"),
            MessageError::NoReply => write!(f, "Message handler did not reply"),
            MessageError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            MessageError::HandlerFailed(msg) => write!(f, "Handler failed: {}", msg),
        }
    }
}

impl std::error::Error for MessageError {}
