use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::csv::StreamConfig;

/// Top-level configuration: the streams to extract.
///
/// Streams come either inline from `files` or from a JSON file named by
/// `csv_files_definition`; the definition file takes precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct TapConfig {
    #[serde(default)]
    #[validate(nested)]
    pub files: Vec<StreamConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csv_files_definition: Option<String>,
}
