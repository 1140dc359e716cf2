use std::path::{Path, PathBuf};

use keybase_core::{KeybaseConfig, KeybaseOptions};
use serde::{Deserialize, Serialize};

/// On-disk CLI configuration (`config.toml`).
#[derive(Debug, Serialize, Deserialize)]
pub struct CliConfig {
    pub keybase: KeybaseSection,
    #[serde(default)]
    pub options: KeybaseOptions,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct KeybaseSection {
    pub name: String,
    pub dir: String,
}

impl CliConfig {
    pub fn new(name: &str, dir: PathBuf, options: KeybaseOptions) -> Self {
        Self {
            keybase: KeybaseSection {
                name: name.to_string(),
                dir: dir.to_string_lossy().to_string(),
            },
            options,
        }
    }

    pub fn keybase_config(&self) -> KeybaseConfig {
        KeybaseConfig::new(&self.keybase.name, &self.keybase.dir).with_options(self.options.clone())
    }
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join("config.toml")
}

pub fn default_store_dir(home: &Path) -> PathBuf {
    home.join("keys")
}

pub fn read_config(path: &Path) -> anyhow::Result<CliConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &CliConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("keybase"));
        }
    }
    Ok(home_dir()?.join(".config").join("keybase"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}
