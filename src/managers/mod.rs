// Jumper state managers
// Managers own stateful feeds and stores: history, open windows, search, views, the viewer store, shortcuts.

pub mod history_manager;
pub mod search_manager;
pub mod shortcut_manager;
pub mod viewer_store;
pub mod views_manager;
pub mod windows_manager;
