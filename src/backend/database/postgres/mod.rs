pub mod schema;
pub mod store_impl;

pub use store_impl::{PostgresAllowlistStore, PostgresOptionAccessor};
