//! Error types for configuration loading and schema validation.
//!
//! Loading a configuration file can fail at three levels: reading the file,
//! parsing its syntax, and validating the parsed record against a schema.
//! The first two are reported through [`Error`]; schema failures are
//! collected into a single [`SchemaError`] that lists every [`Violation`]
//! found in the document.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::format::Format;

/// Errors that can occur while loading or saving a configuration document.
#[derive(Debug, Error)]
pub enum Error {
    /// The configuration file could not be read or written.
    #[error("failed to access configuration file '{}': {source}", path.display())]
    Io {
        /// Path of the file that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file extension does not map to a supported format.
    #[error("unsupported configuration format '{0}' (expected json, toml, yaml or yml)")]
    UnsupportedFormat(String),

    /// The document is not syntactically valid in its format.
    #[error("failed to parse {format} configuration: {details}")]
    Syntax {
        /// Format the document was parsed as.
        format: Format,
        /// Parser diagnostic.
        details: String,
    },

    /// The configuration could not be rendered in the requested format.
    #[error("failed to serialize configuration as {format}: {details}")]
    Serialize {
        /// Requested output format.
        format: Format,
        /// Serializer diagnostic.
        details: String,
    },

    /// The document parsed but does not match the schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl Error {
    /// Creates an [`Io`](Error::Io) error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates a [`Syntax`](Error::Syntax) error.
    pub fn syntax(format: Format, details: impl fmt::Display) -> Self {
        Self::Syntax {
            format,
            details: details.to_string(),
        }
    }

    /// Creates a [`Serialize`](Error::Serialize) error.
    pub fn serialize(format: Format, details: impl fmt::Display) -> Self {
        Self::Serialize {
            format,
            details: details.to_string(),
        }
    }
}

/// A configuration record that failed schema validation.
///
/// Validation walks the whole document, so a single `SchemaError` carries
/// every problem found, in document order. It is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct SchemaError {
    violations: Vec<Violation>,
}

impl SchemaError {
    pub(crate) fn new(violations: Vec<Violation>) -> Self {
        debug_assert!(!violations.is_empty());
        Self { violations }
    }

    /// All violations, in the order they were found.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns `true` if any violation was reported at exactly `path`.
    ///
    /// ```
    /// use mol_readout::config::parse;
    /// use serde_json::json;
    ///
    /// let err = parse(&json!({})).unwrap_err();
    /// assert!(err.has_violation_at("training"));
    /// ```
    pub fn has_violation_at(&self, path: &str) -> bool {
        self.violations.iter().any(|v| v.path.to_string() == path)
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.violations.len();
        write!(
            f,
            "configuration failed validation with {} violation{}",
            n,
            if n == 1 { "" } else { "s" }
        )?;
        for violation in &self.violations {
            write!(f, "\n  {violation}")?;
        }
        Ok(())
    }
}

/// One schema failure at one location in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Location of the offending value.
    pub path: FieldPath,
    /// What is wrong with it.
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.kind)
    }
}

/// The reason a value failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    /// A required field is absent.
    Missing,
    /// A key is not declared by the object's schema.
    Unknown {
        /// Keys the schema accepts at this level.
        allowed: &'static [&'static str],
    },
    /// The value has the wrong primitive shape.
    WrongType {
        /// Description of the accepted shape.
        expected: &'static str,
        /// Description of the shape that was found.
        found: &'static str,
    },
    /// The value is not one of a closed set of literals.
    InvalidChoice {
        /// The rejected value.
        value: String,
        /// The accepted literals.
        allowed: &'static [&'static str],
    },
    /// An integer that must be positive is zero or negative.
    NotPositive {
        /// The rejected value, as written.
        value: String,
    },
    /// A string that must be non-empty is empty.
    Empty,
    /// A list must have the same length as a sibling list.
    LengthMismatch {
        /// The sibling field the length is compared against.
        other: &'static str,
        /// Required length.
        expected: usize,
        /// Actual length.
        found: usize,
    },
    /// A name refers to something that does not exist.
    UnknownReference {
        /// What kind of thing was referenced.
        kind: &'static str,
        /// The unresolved name.
        name: String,
    },
    /// A cross-field constraint does not hold.
    Constraint(String),
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing required field"),
            Self::Unknown { allowed } => {
                write!(f, "unknown field (expected one of: {})", allowed.join(", "))
            }
            Self::WrongType { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::InvalidChoice { value, allowed } => write!(
                f,
                "invalid value '{}' (expected one of: {})",
                value,
                allowed.join(", ")
            ),
            Self::NotPositive { value } => {
                write!(f, "expected a positive integer, found {value}")
            }
            Self::Empty => write!(f, "must not be empty"),
            Self::LengthMismatch {
                other,
                expected,
                found,
            } => write!(
                f,
                "has {found} entries but '{other}' has {expected}; lengths must match"
            ),
            Self::UnknownReference { kind, name } => write!(f, "unknown {kind} '{name}'"),
            Self::Constraint(msg) => f.write_str(msg),
        }
    }
}

/// Location of a value inside a configuration document.
///
/// Renders as dotted keys with bracketed list indices, e.g.
/// `training.targets[0].metric`. The document root renders as `<root>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<PathSegment>);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum PathSegment {
    Key(String),
    Index(usize),
}

impl FieldPath {
    /// The document root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns this path extended by an object key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Key(key.into()));
        next
    }

    /// Returns this path extended by a list index.
    pub fn index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.0.push(PathSegment::Index(index));
        next
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => f.write_str(key)?,
                PathSegment::Key(key) => write!(f, ".{key}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
