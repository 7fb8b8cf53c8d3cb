use serde_json::Value;

use crate::config::{ConfigDocument, ParamMap};
use crate::core::{ListingId, RunMode, RunnerError, RESERVED_PARAM_KEYWORDS};

/// The final, layer-merged, context-enriched parameter mapping for one
/// listing invocation. Built per invocation and discarded after use.
#[derive(Debug, Clone)]
pub struct ResolvedParams {
    values: ParamMap,
}

impl ResolvedParams {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Listing display name, always present after resolution.
    pub fn name(&self) -> &str {
        self.get_str("name").unwrap_or_default()
    }

    pub fn listing_type(&self) -> Result<&str, RunnerError> {
        self.get_str("type")
            .ok_or_else(|| RunnerError::UnsupportedListingType("<unset>".to_string()))
    }

    pub fn mode(&self) -> Result<RunMode, RunnerError> {
        let mode = self
            .get_str("mode")
            .ok_or_else(|| RunnerError::UnknownMode("<unset>".to_string()))?;
        RunMode::parse(mode)
    }

    pub fn save_ext(&self) -> Option<&str> {
        self.get_str("save_ext")
    }

    /// The non-reserved entries, i.e. the actual bind parameters.
    pub fn bind_params(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values
            .iter()
            .filter(|(k, _)| !RESERVED_PARAM_KEYWORDS.contains(&k.as_str()))
    }

    /// Render a parameter value the way it is substituted into SQL text:
    /// strings bare (no quotes), everything else in JSON notation.
    pub fn value_to_string(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Merge the parameter layers for one listing invocation.
///
/// Order is strict: chapter defaults, then the listing's `params` (or the
/// `insert` sub-block's `params` when the insert flag is set), then the
/// requested version block. Each layer overrides same-named keys of the
/// previous one. A requested version key that is absent from the parameter
/// source silently injects nothing; the other missing-configuration
/// conditions are hard errors. Context fields are written last and always
/// win over user parameters.
pub fn resolve_listing(
    doc: &ConfigDocument,
    schema: &str,
    id: &ListingId,
) -> Result<ResolvedParams, RunnerError> {
    let chapter_cfg = doc.chapter(schema, id)?;
    let entry = doc.listing(schema, id)?;

    let mut values = chapter_cfg.defaults.clone();

    let (params, versions) = if id.insert {
        let source = entry
            .insert
            .as_ref()
            .ok_or_else(|| RunnerError::InsertSectionMissing {
                schema: schema.to_string(),
                chapter: id.chapter,
                listing: id.listing,
            })?;
        // insert listings write to the store, so no result is expected
        values.insert("mode".to_string(), Value::String("run".to_string()));
        (&source.params, &source.versions)
    } else {
        (&entry.params, &entry.versions)
    };

    for (k, v) in params {
        values.insert(k.clone(), v.clone());
    }

    if let Some(vers_key) = id.version_key() {
        if let Some(Value::Object(block)) = versions.get(&vers_key) {
            for (k, v) in block {
                values.insert(k.clone(), v.clone());
            }
        }
    }

    values.insert("schema".to_string(), Value::String(schema.to_string()));
    values.insert("chapter".to_string(), Value::from(id.chapter));
    values.insert("listing".to_string(), Value::from(id.listing));
    values.insert("name".to_string(), Value::String(entry.name.clone()));

    Ok(ResolvedParams { values })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> ConfigDocument {
        serde_json::from_str(
            r#"{
                "chap3": {
                    "defaults": {
                        "type": "sql",
                        "mode": "top",
                        "%from_date": "2020-03-01",
                        "%to_date": "2020-05-01"
                    },
                    "list9": {
                        "name": "events_per_account",
                        "params": {"%event_name": "post", "%from_date": "2020-04-01"},
                        "v1": {"%event_name": "like"},
                        "v2": {"%event_name": "message", "%to_date": "2020-06-01"}
                    },
                    "list4": {
                        "name": "metric_insert",
                        "params": {"mode": "one"},
                        "insert": {
                            "params": {"%event_name": "post"},
                            "v1": {"%event_name": "reply"}
                        }
                    },
                    "list11": {
                        "name": "event_qa",
                        "params": {}
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_then_params_precedence() {
        let resolved = resolve_listing(&doc(), "socialnet7", &ListingId::new(3, 9)).unwrap();
        // default not overridden survives
        assert_eq!(resolved.get_str("%to_date"), Some("2020-05-01"));
        // listing param overrides the default
        assert_eq!(resolved.get_str("%from_date"), Some("2020-04-01"));
        // listing-only param present
        assert_eq!(resolved.get_str("%event_name"), Some("post"));
    }

    #[test]
    fn test_version_overrides_both_layers() {
        let id = ListingId {
            chapter: 3,
            listing: 9,
            version: Some(2),
            insert: false,
        };
        let resolved = resolve_listing(&doc(), "socialnet7", &id).unwrap();
        assert_eq!(resolved.get_str("%event_name"), Some("message"));
        assert_eq!(resolved.get_str("%to_date"), Some("2020-06-01"));
    }

    #[test]
    fn test_absent_version_is_silent() {
        let id = ListingId {
            chapter: 3,
            listing: 9,
            version: Some(99),
            insert: false,
        };
        let resolved = resolve_listing(&doc(), "socialnet7", &id).unwrap();
        // no v99 block: the listing params stand
        assert_eq!(resolved.get_str("%event_name"), Some("post"));
    }

    #[test]
    fn test_insert_missing_is_hard_error() {
        let id = ListingId {
            chapter: 3,
            listing: 9,
            version: None,
            insert: true,
        };
        let err = resolve_listing(&doc(), "socialnet7", &id).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::InsertSectionMissing {
                chapter: 3,
                listing: 9,
                ..
            }
        ));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_insert_uses_sub_block_and_forces_run() {
        let id = ListingId {
            chapter: 3,
            listing: 4,
            version: Some(1),
            insert: true,
        };
        let resolved = resolve_listing(&doc(), "socialnet7", &id).unwrap();
        assert_eq!(resolved.mode().unwrap(), RunMode::Run);
        // version block of the insert source applies
        assert_eq!(resolved.get_str("%event_name"), Some("reply"));
        // the regular params block of the listing is not consulted
        assert_eq!(resolved.get_str("mode"), Some("run"));
    }

    #[test]
    fn test_context_fields_always_win() {
        let resolved = resolve_listing(&doc(), "socialnet7", &ListingId::new(3, 11)).unwrap();
        assert_eq!(resolved.get_str("schema"), Some("socialnet7"));
        assert_eq!(resolved.get("chapter"), Some(&Value::from(3u32)));
        assert_eq!(resolved.get("listing"), Some(&Value::from(11u32)));
        assert_eq!(resolved.name(), "event_qa");
    }

    #[test]
    fn test_bind_params_exclude_reserved() {
        let resolved = resolve_listing(&doc(), "socialnet7", &ListingId::new(3, 9)).unwrap();
        let keys: Vec<&str> = resolved.bind_params().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"%event_name"));
        assert!(!keys.contains(&"schema"));
        assert!(!keys.contains(&"mode"));
        assert!(!keys.contains(&"type"));
        assert!(!keys.contains(&"name"));
    }

    #[test]
    fn test_value_to_string_strips_quotes_from_strings() {
        assert_eq!(
            ResolvedParams::value_to_string(&Value::String("x".into())),
            "x"
        );
        assert_eq!(ResolvedParams::value_to_string(&Value::from(42)), "42");
        assert_eq!(ResolvedParams::value_to_string(&Value::from(1.5)), "1.5");
        // booleans render in SQL casing
        assert_eq!(ResolvedParams::value_to_string(&Value::Bool(true)), "true");
    }
}
