//! Jumper database layer.
//!
//! Provides SQLite connection management and schema migrations.
//!
//! # Usage
//!
//! ```no_run
//! use jumper::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("jumper.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//!
//! let backup = db.read_backup("viewer_backup").expect("read failed");
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
