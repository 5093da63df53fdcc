pub mod csv_stream;
pub mod csv_tap;
