pub mod history;
pub mod preview;
pub mod record;

// Re-export command functions for convenience
pub use history::history;
pub use preview::preview;
pub use record::record;
