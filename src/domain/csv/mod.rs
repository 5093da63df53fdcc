// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Core types and value objects for CSV ingestion
// No I/O beyond what configuration parsing needs

mod dialect;
mod file_set;
mod schema;
mod stream_config;

pub use dialect::{DialectConfig, DialectOptions, EncodingErrors, EncodingErrorsSetting};
pub use file_set::ResolvedFileSet;
pub use schema::{PropertyType, Schema, SchemaProperty};
pub use stream_config::StreamConfig;

use indexmap::IndexMap;

/// One parsed row: column name to field text, in header order
pub type Record = IndexMap<String, String>;
