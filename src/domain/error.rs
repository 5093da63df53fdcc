use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TapError {
    #[error("File path does not exist: {}", .path.display())]
    PathNotFound { path: PathBuf },

    #[error("Stream '{stream}' has no acceptable files under {}; see warnings for skipped entries", .path.display())]
    NoEligibleFiles { stream: String, path: PathBuf },

    #[error("Failed to read header of {}: {message}", .path.display())]
    HeaderRead { path: PathBuf, message: String },

    #[error("Failed to parse row {row} of {}: {message}", .path.display())]
    RowParse {
        path: PathBuf,
        row: u64,
        message: String,
    },

    #[error("Failed to open {}: {source}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TapError {
    pub fn header_read(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        TapError::HeaderRead {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn row_parse(path: impl Into<PathBuf>, row: u64, message: impl ToString) -> Self {
        TapError::RowParse {
            path: path.into(),
            row,
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TapError>;
