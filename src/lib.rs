pub mod commands;
pub mod config;
pub mod models;
pub mod notify;
pub mod scheduler;
pub mod sources;
pub mod store;
pub mod translate;
pub mod utils;

// Re-export commonly used types
pub use commands::CommandHandler;
pub use config::AppConfig;
pub use scheduler::{CycleReport, PollScheduler, PollSettings};
pub use store::Database;
