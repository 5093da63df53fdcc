use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Json, Toml};
use figment::Figment;
use tracing::{debug, info};
use validator::Validate;

use crate::domain::csv::StreamConfig;
use crate::domain::error::{Result, TapError};
use crate::domain::tap_config::TapConfig;

/// Environment variables with this prefix override file settings,
/// e.g. `TAP_CSV_CSV_FILES_DEFINITION=/etc/tap/files.json`.
pub const ENV_PREFIX: &str = "TAP_CSV_";

pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the tap configuration from a JSON or TOML file (picked by
    /// extension), then apply environment overrides.
    pub fn load(&self) -> Result<TapConfig> {
        if !self.path.is_file() {
            return Err(TapError::Config(format!(
                "Config file not found: {}",
                self.path.display()
            )));
        }

        let figment = match self.path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Figment::new().merge(Toml::file(&self.path)),
            _ => Figment::new().merge(Json::file(&self.path)),
        };

        let config: TapConfig = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(|e| TapError::Config(e.to_string()))?;

        config
            .validate()
            .map_err(|e| TapError::Config(format!("Invalid configuration: {}", e)))?;

        debug!(path = %self.path.display(), "Loaded tap configuration");
        Ok(config)
    }
}

/// Stream entries to extract. A `csv_files_definition` file replaces the
/// inline `files` list. An empty result is an error.
pub fn stream_configs(config: &TapConfig) -> Result<Vec<StreamConfig>> {
    let streams = match config.csv_files_definition.as_deref() {
        Some(definition) => read_definition_file(Path::new(definition))?,
        None => config.files.clone(),
    };

    if streams.is_empty() {
        return Err(TapError::Config("No CSV files configured".to_string()));
    }

    for stream in &streams {
        stream.check()?;
    }

    info!("Configured {} stream(s)", streams.len());
    Ok(streams)
}

fn read_definition_file(path: &Path) -> Result<Vec<StreamConfig>> {
    if !path.is_file() {
        return Err(TapError::Config(format!(
            "csv_files_definition file not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        TapError::Config(format!(
            "Invalid csv_files_definition {}: {}",
            path.display(),
            e
        ))
    })
}
