// Core modules
pub mod engine;
pub mod gateway;
pub mod ledger;
pub mod models;
pub mod notify;
pub mod settings;
pub mod stats;

// Re-export commonly used types
pub use engine::{spawn_worker, DuplicateGuard, OrderCommand, OrderEngine, SessionWindow};
pub use models::*;
pub use settings::Settings;
