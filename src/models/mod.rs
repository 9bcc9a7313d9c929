use uuid::Uuid;

pub mod item;
pub mod watch_entry;

// Re-exports for convenience
pub use item::*;
pub use watch_entry::*;

// Helper function to generate IDs in the format stored in the database
pub fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
