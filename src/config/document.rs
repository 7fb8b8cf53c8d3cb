use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::core::{ListingId, RunnerError};

/// Flat name/value parameter map. `BTreeMap` keeps iteration deterministic,
/// which matters because SQL substitution walks the keys in order.
pub type ParamMap = BTreeMap<String, Value>;

/// A parameter source: the `params` block plus any version-keyed override
/// blocks (`v1`, `v2`, ...) sitting next to it. Both the listing entry itself
/// and its optional `insert` sub-block have this shape.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParamSource {
    #[serde(default)]
    pub params: ParamMap,
    #[serde(flatten)]
    pub versions: BTreeMap<String, Value>,
}

/// One listing entry of a chapter block.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingEntry {
    pub name: String,
    #[serde(default)]
    pub params: ParamMap,
    #[serde(default)]
    pub insert: Option<ParamSource>,
    #[serde(flatten)]
    pub versions: BTreeMap<String, Value>,
}

/// One chapter block: the chapter-wide defaults and the listing entries
/// keyed `list{N}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChapterConfig {
    #[serde(default)]
    pub defaults: ParamMap,
    #[serde(flatten)]
    pub listings: BTreeMap<String, ListingEntry>,
}

/// The per-schema configuration document, keyed `chap{N}`. Loaded once per
/// run from `{listing_dir}/conf/{schema}_listings.json` and never mutated.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigDocument {
    #[serde(flatten)]
    pub chapters: BTreeMap<String, ChapterConfig>,
}

impl ConfigDocument {
    pub fn load(listing_dir: &Path, schema: &str) -> Result<Self, RunnerError> {
        let path = listing_dir
            .join("conf")
            .join(format!("{schema}_listings.json"));
        if !path.is_file() {
            return Err(RunnerError::ConfigNotFound {
                schema: schema.to_string(),
                path,
            });
        }
        let text = fs::read_to_string(&path)?;
        let doc: Self = serde_json::from_str(&text)?;
        Ok(doc)
    }

    pub fn chapter(&self, schema: &str, id: &ListingId) -> Result<&ChapterConfig, RunnerError> {
        self.chapters
            .get(&id.chapter_key())
            .ok_or_else(|| RunnerError::ChapterNotConfigured {
                schema: schema.to_string(),
                chapter: id.chapter,
            })
    }

    pub fn listing(&self, schema: &str, id: &ListingId) -> Result<&ListingEntry, RunnerError> {
        self.chapter(schema, id)?
            .listings
            .get(&id.listing_key())
            .ok_or_else(|| RunnerError::ListingNotConfigured {
                schema: schema.to_string(),
                chapter: id.chapter,
                listing: id.listing,
            })
    }
}
