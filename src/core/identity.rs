/// Parameter keys that carry run context rather than bind values. They are
/// never substituted into SQL text and never passed to listing functions.
pub const RESERVED_PARAM_KEYWORDS: [&str; 7] = [
    "listing",
    "mode",
    "type",
    "schema",
    "name",
    "chapter",
    "full_name",
];

/// Address of one book listing: chapter and listing number, an optional
/// parameter-version preset, and the insert flag (chapter-7 write variants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingId {
    pub chapter: u32,
    pub listing: u32,
    pub version: Option<u32>,
    pub insert: bool,
}

impl ListingId {
    pub fn new(chapter: u32, listing: u32) -> Self {
        Self {
            chapter,
            listing,
            version: None,
            insert: false,
        }
    }

    /// File/module name of a listing, like `listing_2_1_net_retention`.
    /// Insert listings use the `insert` prefix instead.
    pub fn full_name(&self, name: &str) -> String {
        let prefix = if self.insert { "insert" } else { "listing" };
        format!("{}_{}_{}_{}", prefix, self.chapter, self.listing, name)
    }

    /// Key of this chapter in the configuration document, like `chap2`.
    pub fn chapter_key(&self) -> String {
        format!("chap{}", self.chapter)
    }

    /// Key of this listing in the chapter block, like `list1`.
    pub fn listing_key(&self) -> String {
        format!("list{}", self.listing)
    }

    /// Key of the requested version block, like `v3`, if a version was asked for.
    pub fn version_key(&self) -> Option<String> {
        self.version.map(|v| format!("v{v}"))
    }
}
