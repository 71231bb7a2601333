//! Static inventory error model.

use std::path::PathBuf;

use thiserror::Error;

/// Result type used while loading and resolving a static inventory.
pub type StaticResult<T> = Result<T, StaticSourceError>;

/// The static inventory source could not be loaded.
///
/// Always fatal for the pipeline.
#[derive(Debug, Error)]
pub enum StaticSourceError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Wraps a parse error with the file it came from.
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<StaticSourceError>,
    },

    #[error("line {line}: {message}")]
    Ini { line: usize, message: String },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid inventory structure: {0}")]
    Shape(String),

    #[error("invalid host pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    #[error("adding `{child}` as a child of `{parent}` would create a cycle")]
    Cycle { parent: String, child: String },

    #[error("invalid variables file {}: {message}", path.display())]
    VarsFile { path: PathBuf, message: String },
}

impl StaticSourceError {
    pub fn ini(line: usize, message: impl Into<String>) -> Self {
        Self::Ini {
            line,
            message: message.into(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        Self::Shape(message.into())
    }

    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    pub fn in_file(path: impl Into<PathBuf>, source: StaticSourceError) -> Self {
        Self::InFile {
            path: path.into(),
            source: Box::new(source),
        }
    }
}
