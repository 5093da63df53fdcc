// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Path resolution, dialect-aware parsing, schema inference and
// record streaming

mod csv_parser;
mod file_opener;
mod initial_space;
mod numeric;
mod path_resolver;
mod record_streamer;
mod schema_inferrer;

pub use csv_parser::{unique_headers, CsvParser};
pub use file_opener::{FileOpener, LocalFileOpener};
pub use initial_space::InitialSpaceFilter;
pub use numeric::NumberFormat;
pub use path_resolver::{PathResolver, CSV_EXTENSION};
pub use record_streamer::{RecordStream, RecordStreamer};
pub use schema_inferrer::{SchemaInferrer, SAMPLE_SIZE};
