// Jumper services
// Services provide core functionality: session grouping, feed virtualization, messaging, settings, URL helpers.

pub mod feed_virtualizer;
pub mod messaging;
pub mod session_grouping;
pub mod settings_engine;
pub mod url_utils;
