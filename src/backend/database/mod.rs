//! Database-backed allow-list stores
//!
//! The allow-list is kept as one row of an options table, keyed by
//! [`ALLOWLIST_OPTION`](crate::allowlist::ALLOWLIST_OPTION) and holding a JSON
//! array of strings.
//!
//! # Architecture
//!
//! ```text
//! Common logic (option_store.rs: JSON encoding, get-or-default)
//!     ↓
//! Database-specific accessors
//!     ├── postgres/ (JSONB column)
//!     └── sqlite/   (JSON as TEXT)
//! ```

pub mod config;
pub mod option_store;
pub mod postgres;
pub mod sqlite;

pub use config::DatabaseBackendConfig;
pub use option_store::{OptionAccessor, UnifiedOptionOps};
pub use postgres::{PostgresAllowlistStore, PostgresOptionAccessor};
pub use sqlite::{SqliteAllowlistStore, SqliteOptionAccessor};

/// Table holding persisted settings
pub const OPTIONS_TABLE: &str = "signup_gate_options";
