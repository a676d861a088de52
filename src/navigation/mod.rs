//! Keyboard/pointer navigation state machines.
//!
//! - [`roving_tab_index`]: one logical focus position over registered rows.
//! - [`multi_selection`]: checked rows and bulk actions on top of the roving index.
//! - [`combobox`]: highlighted row of a filterable search-or-create menu.
//! - [`feed_navigator`]: roving index + selection bound to one mounted feed.
//!
//! All operations are synchronous and never fail; out-of-range input is a no-op.

use serde::{Deserialize, Serialize};

pub mod combobox;
pub mod feed_navigator;
pub mod multi_selection;
pub mod roving_tab_index;

/// Direction of a relative move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Next,
    Previous,
}
