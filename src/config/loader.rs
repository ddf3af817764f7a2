use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::WrapErr;
use tracing::debug;

use crate::config::AppConfig;

const CONFIG_DIR: &str = "dialogmgr";
const CONFIG_FILE: &str = "config.toml";

pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(CONFIG_DIR))
}

pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Loads the config from `path`, or from the default location when `None`.
///
/// A missing file yields the defaults. An explicit path that does not exist is
/// an error.
pub fn load(path: Option<&Path>) -> color_eyre::Result<AppConfig> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                color_eyre::eyre::bail!("Config file not found: {}", p.display());
            }
            p.to_path_buf()
        }
        None => match config_path() {
            Some(p) if p.exists() => p,
            Some(p) => {
                debug!("Config file not found at {:?}, using defaults", p);
                return Ok(AppConfig::default());
            }
            None => {
                debug!("No config directory found, using defaults");
                return Ok(AppConfig::default());
            }
        },
    };

    load_from(&path)
}

fn load_from(path: &Path) -> color_eyre::Result<AppConfig> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read config {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse config {}", path.display()))?;
    debug!("Loaded config from {:?}", path);
    Ok(config)
}
