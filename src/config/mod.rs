pub mod schema;

pub use schema::SovereignConfig;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default sovereign home directory (~/.sovereign).
pub fn default_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".sovereign"))
        .unwrap_or_else(|| PathBuf::from(".sovereign"))
}

/// Load config from the given path, or return defaults.
pub fn load_config(path: &Path) -> Result<SovereignConfig> {
    if path.exists() {
        let contents =
            std::fs::read_to_string(path).context("Failed to read sovereign config file")?;
        let config: SovereignConfig =
            toml::from_str(&contents).context("Failed to parse sovereign config (TOML)")?;
        Ok(config)
    } else {
        Ok(SovereignConfig::default())
    }
}

/// Save config to the given path (TOML format).
pub fn save_config(config: &SovereignConfig, path: &Path) -> Result<()> {
    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents).context("Failed to write config file")?;
    Ok(())
}
