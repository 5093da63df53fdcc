//! Delimited-text file ingestion.
//!
//! Resolves a configured file or directory to `.csv` files, infers a
//! string-typed schema from the first file, and streams rows lazily as
//! column-name to text records.

pub mod app;
pub mod application;
pub mod domain;
pub mod infrastructure;

pub use app::init_tracing;
pub use application::{CsvStream, CsvTap, StreamContext, StreamState, TapStream};
pub use domain::csv::{
    DialectConfig, DialectOptions, EncodingErrors, Record, ResolvedFileSet, Schema,
    SchemaProperty, StreamConfig,
};
pub use domain::error::{Result, TapError};
pub use domain::tap_config::TapConfig;
pub use infrastructure::config::ConfigService;
pub use infrastructure::csv::{
    FileOpener, LocalFileOpener, PathResolver, RecordStream, RecordStreamer, SchemaInferrer,
};
