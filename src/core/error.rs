use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("No listing configuration for schema '{schema}' at {path}")]
    ConfigNotFound { schema: String, path: PathBuf },
    #[error("No params for chapter {chapter} in {schema}_listings.json")]
    ChapterNotConfigured { schema: String, chapter: u32 },
    #[error("No listing {listing} for chapter {chapter} in {schema}_listings.json")]
    ListingNotConfigured {
        schema: String,
        chapter: u32,
        listing: u32,
    },
    #[error("No insert section for listing {listing} of chapter {chapter} in {schema}_listings.json")]
    InsertSectionMissing {
        schema: String,
        chapter: u32,
        listing: u32,
    },
    #[error("Unknown run mode '{0}' for SQL listing")]
    UnknownMode(String),
    #[error("Unsupported listing type '{0}'")]
    UnsupportedListingType(String),
    #[error("No registered function '{name}' for chapter {chapter} listings")]
    ListingFunctionNotFound { chapter: u32, name: String },
    #[error("Missing SQL template {0}")]
    TemplateMissing(PathBuf),
    #[error("Expected exactly one result row, got {0}")]
    NotOneRow(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Listing configuration error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl RunnerError {
    /// Distinct process exit code per failure condition, matching the
    /// magnitudes the original runner script exited with.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConfigNotFound { .. } => 1,
            Self::ChapterNotConfigured { .. } => 2,
            Self::ListingNotConfigured { .. } => 3,
            Self::InsertSectionMissing { .. } | Self::UnknownMode(_) => 4,
            Self::ListingFunctionNotFound { .. } => 5,
            _ => 1,
        }
    }
}
