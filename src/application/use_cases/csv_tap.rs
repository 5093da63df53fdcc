// ============================================================
// CSV TAP USE CASE
// ============================================================
// Build one stream per configured file entry

use std::collections::HashSet;

use tracing::info;

use super::csv_stream::CsvStream;
use crate::domain::error::{Result, TapError};
use crate::domain::tap_config::TapConfig;
use crate::infrastructure::config::stream_configs;

pub struct CsvTap {
    config: TapConfig,
}

impl CsvTap {
    pub fn new(config: TapConfig) -> Self {
        Self { config }
    }

    /// Create the configured streams. Nothing is read from the source
    /// paths yet; each stream resolves its files on first use.
    pub fn discover_streams(&self) -> Result<Vec<CsvStream>> {
        let configs = stream_configs(&self.config)?;

        {
            let mut names = HashSet::with_capacity(configs.len());
            for config in &configs {
                if !names.insert(config.name.as_str()) {
                    return Err(TapError::Config(format!(
                        "Stream '{}' is configured more than once",
                        config.name
                    )));
                }
            }
        }

        let streams = configs
            .into_iter()
            .map(CsvStream::new)
            .collect::<Result<Vec<_>>>()?;

        info!("Discovered {} stream(s)", streams.len());
        Ok(streams)
    }
}
