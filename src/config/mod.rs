// Module declarations
pub mod document;
pub mod settings;

// Re-exports for convenience
pub use document::{ChapterConfig, ConfigDocument, ListingEntry, ParamMap, ParamSource};
pub use settings::{Overrides, Settings};
