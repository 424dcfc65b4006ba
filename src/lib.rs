pub mod allowlist;
pub mod auth;
pub mod backend;
pub mod config;
pub mod error;
pub mod gate;
pub mod logging;
pub mod resource;
pub mod startup;

// Re-export commonly used types for easier access
pub use allowlist::{Allowlist, AllowlistInput, AllowlistNormalizer};
pub use backend::AllowlistStore;
pub use error::{AppError, AppResult, ForbiddenEmail};
pub use gate::RegistrationGate;
