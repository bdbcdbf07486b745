//! Extraction options and their TOML file form.
//!
//! Options can be kept in a config file instead of repeating CLI flags:
//!
//! ```toml
//! # lmsmeta.toml
//! [extract]
//! old_physical_size = false
//! image_count = 120
//! original_metadata = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LmsError;

/// Options controlling one extraction pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    /// Legacy physical step formula (length / count).
    pub old_physical_size: bool,

    /// Plane count used to truncate timestamps instead of the computed one.
    pub image_count: Option<usize>,

    /// Flatten every attribute into the original-metadata table.
    pub original_metadata: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            old_physical_size: false,
            image_count: None,
            original_metadata: true,
        }
    }
}

/// Root of an `lmsmeta.toml` file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extract: ExtractOptions,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, LmsError> {
        let content = std::fs::read_to_string(path).map_err(|source| LmsError::Config {
            path: path.to_path_buf(),
            message: source.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Parse configuration from a TOML string; `path` only labels errors.
    pub fn parse(content: &str, path: &Path) -> Result<Self, LmsError> {
        toml::from_str(content).map_err(|source: toml::de::Error| LmsError::Config {
            path: path.to_path_buf(),
            message: source.message().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_extract_table() {
        let toml = r#"
            [extract]
            old_physical_size = true
            image_count = 12
        "#;
        let config = Config::parse(toml, Path::new("<string>")).unwrap();
        assert!(config.extract.old_physical_size);
        assert_eq!(config.extract.image_count, Some(12));
        assert!(config.extract.original_metadata);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("", Path::new("<string>")).unwrap();
        assert_eq!(config.extract, ExtractOptions::default());
    }

    #[test]
    fn invalid_toml_reports_config_error() {
        let err = Config::parse("[extract]\nimage_count = \"many\"", Path::new("bad.toml")).unwrap_err();
        match err {
            LmsError::Config { path, .. } => assert_eq!(path, Path::new("bad.toml")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[extract]\noriginal_metadata = false").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert!(!config.extract.original_metadata);
    }

    #[test]
    fn missing_file_reports_config_error() {
        let err = Config::from_file(Path::new("/nonexistent/lmsmeta.toml")).unwrap_err();
        assert!(matches!(err, LmsError::Config { .. }));
    }
}
