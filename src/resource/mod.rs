pub mod health;
pub mod hook;
pub mod settings;
