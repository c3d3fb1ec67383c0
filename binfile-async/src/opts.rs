use binfile_core::binlog::{ParserOpts, DEFAULT_EVENT_TYPE_COUNT};
use serde_derive::{Deserialize, Serialize};

/// options of reading binlog files,
/// missing fields take default values when deserialized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderOpts {
    // open next file named by rotate event and continue
    pub follow_rotation: bool,
    pub event_type_count: u8,
    pub validate_checksum: bool,
    pub strict_event_types: bool,
}

impl Default for ReaderOpts {
    fn default() -> Self {
        ReaderOpts {
            follow_rotation: false,
            event_type_count: DEFAULT_EVENT_TYPE_COUNT,
            validate_checksum: false,
            strict_event_types: false,
        }
    }
}

impl ReaderOpts {
    pub fn follow_rotation(mut self, follow_rotation: bool) -> Self {
        self.follow_rotation = follow_rotation;
        self
    }

    pub fn event_type_count(mut self, event_type_count: u8) -> Self {
        self.event_type_count = event_type_count;
        self
    }

    pub fn validate_checksum(mut self, validate_checksum: bool) -> Self {
        self.validate_checksum = validate_checksum;
        self
    }

    pub fn strict_event_types(mut self, strict_event_types: bool) -> Self {
        self.strict_event_types = strict_event_types;
        self
    }

    pub fn parser_opts(&self) -> ParserOpts {
        ParserOpts {
            event_type_count: self.event_type_count,
            strict_event_types: self.strict_event_types,
            validate_checksum: self.validate_checksum,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opts_from_toml() -> Result<(), toml::de::Error> {
        let opts: ReaderOpts = toml::from_str("follow_rotation = true")?;
        assert_eq!(ReaderOpts::default().follow_rotation(true), opts);
        let opts: ReaderOpts = toml::from_str(
            r#"
            event_type_count = 35
            validate_checksum = true
            strict_event_types = true
            "#,
        )?;
        assert!(!opts.follow_rotation);
        let parser_opts = opts.parser_opts();
        assert_eq!(35, parser_opts.event_type_count);
        assert!(parser_opts.validate_checksum);
        assert!(parser_opts.strict_event_types);
        Ok(())
    }

    #[test]
    fn test_default_opts() {
        let opts = ReaderOpts::default();
        assert!(!opts.follow_rotation);
        assert_eq!(ParserOpts::default(), opts.parser_opts());
        let s = toml::to_string(&opts).unwrap();
        assert!(s.contains("event_type_count = 27"));
    }
}
