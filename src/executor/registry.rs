use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use crate::config::ParamMap;
use crate::core::{ListingId, RunnerError};
use crate::resolve::ResolvedParams;

/// Arguments passed to a code listing: the resolved parameters minus the
/// reserved context keys, with `*path` values re-rooted under the output
/// directory.
#[derive(Debug, Clone)]
pub struct ListingArgs {
    values: ParamMap,
}

impl ListingArgs {
    pub fn from_resolved(params: &ResolvedParams, out_dir: &Path) -> Self {
        let mut values = ParamMap::new();
        for (key, value) in params.bind_params() {
            let value = if key.ends_with("path") {
                match value {
                    Value::String(rel) => {
                        Value::String(out_dir.join(rel).to_string_lossy().into_owned())
                    }
                    other => other.clone(),
                }
            } else {
                value.clone()
            };
            values.insert(key.clone(), value);
        }
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.values.get(key).and_then(Value::as_f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

pub type ListingFn = Arc<dyn Fn(&ListingArgs) -> Result<(), RunnerError> + Send + Sync>;

/// Explicit mapping from (chapter, listing base name) to a runnable handler,
/// built at startup. Code listings are looked up here instead of being
/// resolved by reflection at run time; a miss is a typed error.
#[derive(Default, Clone)]
pub struct ListingRegistry {
    handlers: HashMap<(u32, String), ListingFn>,
}

impl ListingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, chapter: u32, name: &str, handler: F)
    where
        F: Fn(&ListingArgs) -> Result<(), RunnerError> + Send + Sync + 'static,
    {
        self.handlers
            .insert((chapter, name.to_string()), Arc::new(handler));
    }

    pub fn contains(&self, chapter: u32, name: &str) -> bool {
        self.handlers.contains_key(&(chapter, name.to_string()))
    }

    /// Invoke the handler registered for this listing. The handler's only
    /// contract is success or failure; any output files are its own business.
    pub fn run(
        &self,
        out_dir: &Path,
        id: &ListingId,
        params: &ResolvedParams,
    ) -> Result<(), RunnerError> {
        let name = params.name();
        let handler = self.handlers.get(&(id.chapter, name.to_string())).ok_or(
            RunnerError::ListingFunctionNotFound {
                chapter: id.chapter,
                name: name.to_string(),
            },
        )?;
        let args = ListingArgs::from_resolved(params, out_dir);
        handler(&args)
    }
}

impl std::fmt::Debug for ListingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigDocument;
    use crate::resolve::resolve_listing;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn resolved() -> ResolvedParams {
        let doc: ConfigDocument = serde_json::from_str(
            r#"{"chap5": {
                "defaults": {"type": "py", "mode": "run"},
                "list2": {
                    "name": "dataset_stats",
                    "params": {"n_bins": 20, "score_save_path": "stats.csv"}
                }
            }}"#,
        )
        .unwrap();
        resolve_listing(&doc, "socialnet7", &ListingId::new(5, 2)).unwrap()
    }

    #[test]
    fn test_args_filter_reserved_and_rewrite_paths() {
        let args = ListingArgs::from_resolved(&resolved(), Path::new("/out"));
        assert_eq!(args.get_i64("n_bins"), Some(20));
        // path-suffixed values are re-rooted under the output directory
        assert_eq!(args.get_str("score_save_path"), Some("/out/stats.csv"));
        // reserved context keys are filtered out
        assert!(args.get("schema").is_none());
        assert!(args.get("name").is_none());
        assert!(args.get("type").is_none());
    }

    #[test]
    fn test_registered_handler_runs_with_args() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let mut registry = ListingRegistry::new();
        registry.register(5, "dataset_stats", |args| {
            assert_eq!(args.get_i64("n_bins"), Some(20));
            CALLS.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let id = ListingId::new(5, 2);
        registry.run(Path::new("/out"), &id, &resolved()).unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unregistered_listing_is_typed_error() {
        let registry = ListingRegistry::new();
        let id = ListingId::new(5, 2);
        let err = registry
            .run(Path::new("/out"), &id, &resolved())
            .unwrap_err();
        assert!(matches!(
            err,
            RunnerError::ListingFunctionNotFound { chapter: 5, ref name } if name == "dataset_stats"
        ));
        assert_eq!(err.exit_code(), 5);
    }
}
