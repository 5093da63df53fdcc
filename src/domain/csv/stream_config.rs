// ============================================================
// STREAM CONFIGURATION
// ============================================================
// One configured logical source: identity, path, dialect, keys

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use super::DialectOptions;
use crate::domain::error::{Result, TapError};

/// Configuration for a single CSV stream.
///
/// Immutable once handed to a stream. Dialect options sit at the same
/// level as `name` and `path`, matching the flat file entries operators
/// already write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StreamConfig {
    /// Stream name (also accepted as `entity`)
    #[serde(alias = "entity")]
    #[validate(length(min = 1, message = "stream name must not be empty"))]
    pub name: String,

    /// A single file or a directory of files
    #[validate(length(min = 1, message = "path must not be empty"))]
    pub path: String,

    /// Primary-key column names, passed through untouched
    #[serde(default)]
    pub keys: Vec<String>,

    #[serde(flatten)]
    pub dialect: DialectOptions,
}

impl StreamConfig {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            keys: Vec::new(),
            dialect: DialectOptions::default(),
        }
    }

    pub fn with_keys(mut self, keys: Vec<String>) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_dialect(mut self, dialect: DialectOptions) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn source_path(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }

    /// Check required fields before the stream is built
    pub fn check(&self) -> Result<()> {
        self.validate().map_err(|e| {
            TapError::Config(format!("Invalid stream config '{}': {}", self.name, e))
        })
    }
}
