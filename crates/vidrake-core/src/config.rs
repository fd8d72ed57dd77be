use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

fn default_ffmpeg_path() -> String {
    "/usr/bin/ffmpeg".to_string()
}

fn default_source_ext() -> String {
    "webm".to_string()
}

fn default_target_ext() -> String {
    "mp4".to_string()
}

fn default_scheme() -> String {
    "http".to_string()
}

fn default_max_concurrent() -> usize {
    4
}

fn default_progress_interval_ms() -> u64 {
    1000
}

/// Global configuration loaded from `~/.config/vidrake/config.toml`.
///
/// Every field has a default so a partial (or missing) file still yields a
/// usable configuration; CLI flags override loaded values per run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VidrakeConfig {
    /// Location of the external transcoder binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// Extension substring identifying files to harvest (e.g. "webm", "avi").
    #[serde(default = "default_source_ext")]
    pub source_ext: String,
    /// Output extension for conversion.
    #[serde(default = "default_target_ext")]
    pub target_ext: String,
    /// Scheme used to complete scheme-relative links: "http" or "https".
    #[serde(default = "default_scheme")]
    pub scheme: String,
    /// Maximum number of download-convert units in flight at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
    /// Keep the downloaded original after conversion instead of removing it.
    #[serde(default)]
    pub keep_source: bool,
    /// Progress monitor tick in milliseconds.
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,
}

impl Default for VidrakeConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            source_ext: default_source_ext(),
            target_ext: default_target_ext(),
            scheme: default_scheme(),
            max_concurrent: default_max_concurrent(),
            keep_source: false,
            progress_interval_ms: default_progress_interval_ms(),
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vidrake")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VidrakeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VidrakeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: VidrakeConfig = toml::from_str(&data)?;
    Ok(cfg)
}
