// Churnbook - runner for the Fighting Churn with Data companion listings
// Resolves per-schema parameters, substitutes SQL templates, and executes
// them against PostgreSQL, printing or saving the results.

// Core types (listing identity, run modes, error taxonomy)
pub mod core;

// Configuration (runner settings, per-schema listing documents)
pub mod config;

// Parameter resolution (layered merge of defaults, params, version blocks)
pub mod resolve;

// Executors (SQL templates, registered code listings) and the dispatcher
pub mod executor;

// Serialized console output shared by concurrent listing units
pub mod output;

// Batch runner (sequential and bounded-parallel fan-out over versions)
pub mod runner;

// Re-export commonly used types for convenience
pub use crate::config::{ConfigDocument, Overrides, Settings};
pub use crate::core::{ListingId, RunMode, RunnerError, RESERVED_PARAM_KEYWORDS};
pub use crate::executor::{dispatch, ListingArgs, ListingRegistry};
pub use crate::resolve::{resolve_listing, ResolvedParams};
pub use crate::runner::{plan, ListingRunner, RunRequest};
