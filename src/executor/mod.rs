// Module declarations
pub mod registry;
pub mod sql;

// Re-exports for convenience
pub use registry::{ListingArgs, ListingFn, ListingRegistry};
pub use sql::PRINT_NUM_ROWS;

use sqlx::PgPool;

use crate::config::Settings;
use crate::core::{ListingId, RunnerError};
use crate::resolve::ResolvedParams;

/// Route a resolved listing to its executor by declared type: `sql` runs the
/// template against the store, `py` invokes the registered handler.
pub async fn dispatch(
    pool: &PgPool,
    settings: &Settings,
    registry: &ListingRegistry,
    id: &ListingId,
    params: &ResolvedParams,
) -> Result<(), RunnerError> {
    match params.listing_type()? {
        "sql" => sql::run_sql_listing(pool, settings, id, params).await,
        "py" => registry.run(&settings.out_dir, id, params),
        other => Err(RunnerError::UnsupportedListingType(other.to_string())),
    }
}
