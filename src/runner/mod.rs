// Module declarations
pub mod standard;

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::{ConfigDocument, Settings};
use crate::core::{ListingId, RunnerError};
use crate::executor::{self, ListingRegistry};
use crate::output;
use crate::resolve::resolve_listing;

/// One batch: a set of listing numbers and version numbers of a chapter,
/// plus the shared run context.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub schema: String,
    pub chapter: u32,
    pub listings: Vec<u32>,
    pub versions: Vec<u32>,
    pub insert: bool,
    pub n_parallel: usize,
}

impl RunRequest {
    pub fn new(schema: &str, chapter: u32, listings: Vec<u32>) -> Self {
        Self {
            schema: schema.to_string(),
            chapter,
            listings,
            versions: Vec::new(),
            insert: false,
            n_parallel: 1,
        }
    }

    pub fn versions(mut self, versions: Vec<u32>) -> Self {
        self.versions = versions;
        self
    }

    pub fn insert(mut self) -> Self {
        self.insert = true;
        self
    }
}

/// Expand a request into ordered (listing, version) units: listings in given
/// order, and within each listing the versions in given order. No versions
/// means one unit per listing.
pub fn plan(listings: &[u32], versions: &[u32]) -> Vec<(u32, Option<u32>)> {
    let mut units = Vec::new();
    for &listing in listings {
        if versions.is_empty() {
            units.push((listing, None));
        } else {
            for &version in versions {
                units.push((listing, Some(version)));
            }
        }
    }
    units
}

/// Executes batches of listings against one connection pool.
#[derive(Debug, Clone)]
pub struct ListingRunner {
    settings: Arc<Settings>,
    pool: PgPool,
    registry: Arc<ListingRegistry>,
}

impl ListingRunner {
    /// Connect to the store and build a runner. The pool is sized to the
    /// parallelism degree so each in-flight unit holds its own connection.
    pub async fn connect(
        settings: Settings,
        registry: ListingRegistry,
        n_parallel: usize,
    ) -> Result<Self, RunnerError> {
        let pool = settings.connect(n_parallel).await?;
        Ok(Self::with_pool(settings, registry, pool))
    }

    pub fn with_pool(settings: Settings, registry: ListingRegistry, pool: PgPool) -> Self {
        Self {
            settings: Arc::new(settings),
            pool,
            registry: Arc::new(registry),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run a batch. The configuration document is loaded fresh per run.
    ///
    /// Sequential execution stops at the first failing unit. Parallel
    /// execution (degree > 1 with versions) lets a failure halt only its own
    /// unit; remaining versions of the listing finish, then the first error
    /// is returned.
    pub async fn run(&self, req: &RunRequest) -> Result<(), RunnerError> {
        let doc = Arc::new(ConfigDocument::load(&self.settings.listing_dir, &req.schema)?);

        if req.versions.is_empty() || req.n_parallel <= 1 {
            for (listing, version) in plan(&req.listings, &req.versions) {
                let id = ListingId {
                    chapter: req.chapter,
                    listing,
                    version,
                    insert: req.insert,
                };
                self.unit(doc.clone(), req.schema.clone(), id).await?;
            }
            return Ok(());
        }

        for &listing in &req.listings {
            let semaphore = Arc::new(Semaphore::new(req.n_parallel));
            let mut workers: JoinSet<(u32, Result<(), RunnerError>)> = JoinSet::new();
            for &version in &req.versions {
                let semaphore = semaphore.clone();
                let runner = self.clone();
                let doc = doc.clone();
                let schema = req.schema.clone();
                let id = ListingId {
                    chapter: req.chapter,
                    listing,
                    version: Some(version),
                    insert: req.insert,
                };
                workers.spawn(async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
                    (version, runner.unit(doc, schema, id).await)
                });
            }

            let mut first_err = None;
            while let Some(joined) = workers.join_next().await {
                match joined {
                    Ok((_, Ok(()))) => {}
                    Ok((version, Err(err))) => {
                        tracing::error!(listing, version, error = %err, "listing version failed");
                        if first_err.is_none() {
                            first_err = Some(err);
                        }
                    }
                    Err(join_err) => {
                        tracing::error!(listing, error = %join_err, "listing worker panicked");
                        if first_err.is_none() {
                            first_err = Some(join_err.into());
                        }
                    }
                }
            }
            if let Some(err) = first_err {
                return Err(err);
            }
        }
        Ok(())
    }

    async fn unit(
        &self,
        doc: Arc<ConfigDocument>,
        schema: String,
        id: ListingId,
    ) -> Result<(), RunnerError> {
        let params = resolve_listing(&doc, &schema, &id)?;
        tracing::info!(
            chapter = id.chapter,
            listing = id.listing,
            version = ?id.version,
            name = params.name(),
            schema = %schema,
            "running listing"
        );
        output::print_block(&format!(
            "\nRunning chapter {} listing {} {} on schema {}",
            id.chapter,
            id.listing,
            params.name(),
            schema
        ))
        .await;
        executor::dispatch(&self.pool, &self.settings, &self.registry, &id, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_order_is_listing_major() {
        assert_eq!(
            plan(&[1, 2], &[1, 2]),
            vec![(1, Some(1)), (1, Some(2)), (2, Some(1)), (2, Some(2))]
        );
    }

    #[test]
    fn test_plan_without_versions() {
        assert_eq!(plan(&[3, 1, 2], &[]), vec![(3, None), (1, None), (2, None)]);
    }

    #[test]
    fn test_plan_preserves_given_version_order() {
        assert_eq!(
            plan(&[5], &[2, 1]),
            vec![(5, Some(2)), (5, Some(1))]
        );
    }
}
