pub mod ask;
pub mod batch;
pub mod config;
pub mod process;

use std::path::{Path, PathBuf};

use tracing::debug;

use cardstmt_core::StatementConfig;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("cardstmt")
        .join("config.json")
}

/// Load the configuration named on the command line, else the default file
/// if present, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<StatementConfig> {
    if let Some(path) = config_path {
        return Ok(StatementConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Using configuration from {}", path.display());
        Ok(StatementConfig::from_file(&path)?)
    } else {
        Ok(StatementConfig::default())
    }
}
