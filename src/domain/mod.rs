pub mod error;
pub mod tap_config;

// CSV ingestion module
pub mod csv;
