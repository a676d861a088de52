//! Jumper: background state for a tab and history jumper overlay.
//!
//! Groups browsing history into day buckets, composes views over open tabs,
//! history and saved objects, and drives keyboard navigation, multi-selection
//! and menus for the virtualized feed. This library crate exposes all modules
//! for use by the binaries and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod navigation;
pub mod platform;
pub mod rpc_handler;
pub mod services;
pub mod types;
