//! Configuration file formats and conversion to and from generic records.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::error::Error;

/// On-disk syntax of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Toml,
    Yaml,
}

impl Format {
    /// Infers the format from a file extension (case-insensitive).
    ///
    /// ```
    /// use std::path::Path;
    /// use mol_readout::config::Format;
    ///
    /// assert_eq!(Format::from_path(Path::new("data.yml")).unwrap(), Format::Yaml);
    /// assert!(Format::from_path(Path::new("data.csv")).is_err());
    /// ```
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        ext.parse()
    }

    /// Parses `text` into a generic record without any schema checks.
    pub fn parse_value(self, text: &str) -> Result<Value, Error> {
        match self {
            Format::Json => serde_json::from_str(text).map_err(|e| Error::syntax(self, e)),
            Format::Toml => toml::from_str(text).map_err(|e| Error::syntax(self, e)),
            Format::Yaml => serde_yaml::from_str(text).map_err(|e| Error::syntax(self, e)),
        }
    }

    /// Renders `value` in this format.
    pub fn render<T: Serialize>(self, value: &T) -> Result<String, Error> {
        match self {
            Format::Json => {
                serde_json::to_string_pretty(value).map_err(|e| Error::serialize(self, e))
            }
            Format::Toml => toml::to_string_pretty(value).map_err(|e| Error::serialize(self, e)),
            Format::Yaml => serde_yaml::to_string(value).map_err(|e| Error::serialize(self, e)),
        }
    }
}

impl std::str::FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(Error::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Json => write!(f, "JSON"),
            Format::Toml => write!(f, "TOML"),
            Format::Yaml => write!(f, "YAML"),
        }
    }
}
