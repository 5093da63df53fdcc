// ============================================================
// CSV STREAM USE CASE
// ============================================================
// One named source: resolve files and infer schema once, then serve
// any number of fresh record sequences

use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::csv::{DialectConfig, Record, ResolvedFileSet, Schema, StreamConfig};
use crate::domain::error::{Result, TapError};
use crate::infrastructure::csv::{
    CsvParser, FileOpener, LocalFileOpener, PathResolver, RecordStream, RecordStreamer,
    SchemaInferrer,
};

/// Opaque partition token handed over by the harness; ignored
pub type StreamContext = Map<String, Value>;

/// What the harness can ask of a stream
pub trait TapStream {
    type Records: Iterator<Item = Result<Record>>;

    fn name(&self) -> &str;

    fn primary_keys(&self) -> &[String];

    fn get_file_paths(&self) -> Result<Arc<ResolvedFileSet>>;

    fn get_schema(&self) -> Result<Arc<Schema>>;

    fn get_records(&self, context: Option<&StreamContext>) -> Result<Self::Records>;
}

/// Lifecycle of a stream's caches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Uninitialized,
    PathsResolved,
    SchemaReady,
}

/// CSV stream bound to one configured path and dialect.
///
/// File paths and schema are computed lazily on first use and cached for
/// the stream's lifetime. Concurrent first access computes each at most
/// once. Schema comes from the first resolved file only; other files are
/// streamed with their own headers and never checked against it.
pub struct CsvStream {
    config: StreamConfig,
    parser: Arc<CsvParser>,
    resolver: PathResolver,
    opener: Arc<dyn FileOpener>,
    file_paths: OnceCell<Arc<ResolvedFileSet>>,
    schema: OnceCell<Arc<Schema>>,
}

impl CsvStream {
    /// Create a stream reading from the local filesystem
    pub fn new(config: StreamConfig) -> Result<Self> {
        Self::with_opener(config, Arc::new(LocalFileOpener))
    }

    /// Create a stream reading file contents through `opener`
    pub fn with_opener(config: StreamConfig, opener: Arc<dyn FileOpener>) -> Result<Self> {
        config.check()?;
        let dialect = DialectConfig::resolve(&config.dialect)?;
        let parser = Arc::new(CsvParser::new(&dialect)?);

        Ok(Self {
            config,
            parser,
            resolver: PathResolver::new(),
            opener,
            file_paths: OnceCell::new(),
            schema: OnceCell::new(),
        })
    }

    pub fn dialect(&self) -> &DialectConfig {
        self.parser.dialect()
    }

    pub fn state(&self) -> StreamState {
        if self.schema.get().is_some() {
            StreamState::SchemaReady
        } else if self.file_paths.get().is_some() {
            StreamState::PathsResolved
        } else {
            StreamState::Uninitialized
        }
    }

    fn records(&self) -> Result<RecordStream> {
        let files = self.get_file_paths()?;
        let streamer = RecordStreamer::new(Arc::clone(&self.opener), Arc::clone(&self.parser));
        Ok(streamer.stream(files))
    }
}

impl TapStream for CsvStream {
    type Records = RecordStream;

    fn name(&self) -> &str {
        &self.config.name
    }

    fn primary_keys(&self) -> &[String] {
        &self.config.keys
    }

    fn get_file_paths(&self) -> Result<Arc<ResolvedFileSet>> {
        self.file_paths
            .get_or_try_init(|| {
                debug!(stream = %self.config.name, "Resolving file paths");
                self.resolver
                    .resolve(&self.config.name, &self.config.source_path())
                    .map(Arc::new)
            })
            .map(Arc::clone)
    }

    fn get_schema(&self) -> Result<Arc<Schema>> {
        self.schema
            .get_or_try_init(|| {
                let files = self.get_file_paths()?;
                let first = files.first().ok_or_else(|| TapError::NoEligibleFiles {
                    stream: self.config.name.clone(),
                    path: self.config.source_path(),
                })?;
                debug!(stream = %self.config.name, path = %first.display(), "Inferring schema");
                SchemaInferrer::new(Arc::clone(&self.opener))
                    .infer(first, &self.parser)
                    .map(Arc::new)
            })
            .map(Arc::clone)
    }

    fn get_records(&self, _context: Option<&StreamContext>) -> Result<RecordStream> {
        self.records()
    }
}
