// Jumper shared type definitions
// Each submodule defines types used across the feeds, views and navigation layers.

pub mod errors;
pub mod feed;
pub mod history;
pub mod message;
pub mod object;
pub mod settings;
pub mod tab;
pub mod view;
pub mod visit;
