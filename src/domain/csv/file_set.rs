// ============================================================
// RESOLVED FILE SET
// ============================================================
// Ordered, validated list of source files belonging to one stream

use std::path::{Path, PathBuf};

/// Files a stream reads, in filesystem enumeration order.
/// Never empty when produced by the path resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFileSet {
    files: Vec<PathBuf>,
    skipped: Vec<PathBuf>,
}

impl ResolvedFileSet {
    pub fn new(files: Vec<PathBuf>, skipped: Vec<PathBuf>) -> Self {
        Self { files, skipped }
    }

    /// Accepted files
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Entries rejected by the extension filter
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }

    /// File used for schema inference
    pub fn first(&self) -> Option<&Path> {
        self.files.first().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
