// Module declarations
pub mod error;
pub mod identity;
pub mod mode;

// Re-exports for convenience
pub use error::RunnerError;
pub use identity::{ListingId, RESERVED_PARAM_KEYWORDS};
pub use mode::RunMode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let id = ListingId::new(2, 1);
        assert_eq!(id.full_name("net_retention"), "listing_2_1_net_retention");
    }

    #[test]
    fn test_full_name_insert() {
        let id = ListingId {
            chapter: 7,
            listing: 3,
            version: None,
            insert: true,
        };
        assert_eq!(id.full_name("metric_total"), "insert_7_3_metric_total");
    }

    #[test]
    fn test_config_keys() {
        let id = ListingId {
            chapter: 3,
            listing: 9,
            version: Some(4),
            insert: false,
        };
        assert_eq!(id.chapter_key(), "chap3");
        assert_eq!(id.listing_key(), "list9");
        assert_eq!(id.version_key(), Some("v4".to_string()));
        assert_eq!(ListingId::new(3, 9).version_key(), None);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(RunMode::parse("run").unwrap(), RunMode::Run);
        assert_eq!(RunMode::parse("one").unwrap(), RunMode::One);
        assert_eq!(RunMode::parse("top").unwrap(), RunMode::Top);
        assert_eq!(RunMode::parse("save").unwrap(), RunMode::Save);
        assert!(matches!(
            RunMode::parse("stream"),
            Err(RunnerError::UnknownMode(m)) if m == "stream"
        ));
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        let codes = [
            RunnerError::ConfigNotFound {
                schema: "s".into(),
                path: "x".into(),
            }
            .exit_code(),
            RunnerError::ChapterNotConfigured {
                schema: "s".into(),
                chapter: 2,
            }
            .exit_code(),
            RunnerError::ListingNotConfigured {
                schema: "s".into(),
                chapter: 2,
                listing: 1,
            }
            .exit_code(),
            RunnerError::UnknownMode("x".into()).exit_code(),
            RunnerError::ListingFunctionNotFound {
                chapter: 5,
                name: "f".into(),
            }
            .exit_code(),
        ];
        assert_eq!(codes, [1, 2, 3, 4, 5]);
    }
}
