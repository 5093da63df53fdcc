pub mod use_cases;

pub use use_cases::csv_stream::{CsvStream, StreamContext, StreamState, TapStream};
pub use use_cases::csv_tap::CsvTap;
