// ============================================================
// PATH RESOLVER
// ============================================================
// Expand a configured file or directory into the files a stream reads

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::csv::ResolvedFileSet;
use crate::domain::error::{Result, TapError};

/// Accepted file extension. Matched case-sensitively.
pub const CSV_EXTENSION: &str = ".csv";

/// Resolves stream paths to an ordered, validated list of files
#[derive(Debug, Clone)]
pub struct PathResolver {
    extension: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self {
            extension: CSV_EXTENSION.to_string(),
        }
    }
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom extension (including the leading dot)
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Resolve `path` for the stream called `stream`.
    ///
    /// A directory contributes its direct children in enumeration order;
    /// a file contributes itself. Entries failing the extension filter are
    /// skipped with a warning. Fails when the path does not exist or
    /// nothing survives the filter.
    pub fn resolve(&self, stream: &str, path: &Path) -> Result<ResolvedFileSet> {
        if !path.try_exists()? {
            return Err(TapError::PathNotFound {
                path: path.to_path_buf(),
            });
        }

        let root = fs::canonicalize(path)?;
        let mut files = Vec::new();
        let mut skipped = Vec::new();

        if root.is_dir() {
            for entry in fs::read_dir(&root)? {
                let candidate = entry?.path();
                if self.accepts(&candidate) && candidate.is_file() {
                    files.push(candidate);
                } else {
                    self.skip(stream, candidate, &mut skipped);
                }
            }
        } else if self.accepts(&root) {
            files.push(root.clone());
        } else {
            self.skip(stream, root.clone(), &mut skipped);
        }

        if files.is_empty() {
            return Err(TapError::NoEligibleFiles {
                stream: stream.to_string(),
                path: path.to_path_buf(),
            });
        }

        info!(
            stream = %stream,
            files = files.len(),
            skipped = skipped.len(),
            "Resolved source files"
        );
        debug!(stream = %stream, ?files, "Resolved file list");

        Ok(ResolvedFileSet::new(files, skipped))
    }

    /// Whether the file name ends with the configured extension
    pub fn accepts(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.ends_with(&self.extension))
            .unwrap_or(false)
    }

    fn skip(&self, stream: &str, path: PathBuf, skipped: &mut Vec<PathBuf>) {
        warn!(
            stream = %stream,
            path = %path.display(),
            "Skipping non-{} entry; provide files ending in '{}', e.g. 'users{}'",
            self.extension.trim_start_matches('.'),
            self.extension,
            self.extension
        );
        skipped.push(path);
    }
}
