//! Configuration file handling.
//!
//! Settings live in a TOML file under the platform config directory
//! (`~/.config/garimpo/config.toml` on Linux). Every setting has a
//! default and every CLI flag overrides its file value, so the file is
//! optional. `GARIMPO_CONFIG` points at an alternate file for tests
//! and portable setups.

use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::{GarimpoError, Result};

fn default_output_dir() -> PathBuf {
    PathBuf::from("./Outputs")
}

fn default_title_case() -> bool {
    true
}

fn default_min_image_bytes() -> u64 {
    crate::dedup::DEFAULT_MIN_IMAGE_BYTES
}

fn default_ffmpeg_timeout_secs() -> u64 {
    crate::media::DEFAULT_FFMPEG_TIMEOUT_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base directory for per-product output directories.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Title-case product names when normalizing them.
    #[serde(default = "default_title_case")]
    pub title_case_names: bool,

    /// Images below this size are purged as junk during reduction.
    #[serde(default = "default_min_image_bytes")]
    pub min_image_bytes: u64,

    /// Upper bound for one HLS remux subprocess.
    #[serde(default = "default_ffmpeg_timeout_secs")]
    pub ffmpeg_timeout_secs: u64,

    /// Use the headless browser engine by default.
    #[serde(default)]
    pub browser_engine: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_dir: default_output_dir(),
            title_case_names: default_title_case(),
            min_image_bytes: default_min_image_bytes(),
            ffmpeg_timeout_secs: default_ffmpeg_timeout_secs(),
            browser_engine: false,
        }
    }
}

impl Config {
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("GARIMPO_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let dirs = ProjectDirs::from("", "", "garimpo").ok_or_else(|| {
            GarimpoError::ConfigError("cannot determine config directory".to_string())
        })?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load the config file, falling back to defaults when absent.
    pub fn load() -> Result<Config> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.output_dir, PathBuf::from("./Outputs"));
        assert!(config.title_case_names);
        assert_eq!(config.min_image_bytes, 2048);
        assert_eq!(config.ffmpeg_timeout_secs, 300);
        assert!(!config.browser_engine);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config = toml::from_str("min_image_bytes = 4096").unwrap();
        assert_eq!(config.min_image_bytes, 4096);
        assert!(config.title_case_names);
        assert_eq!(config.output_dir, PathBuf::from("./Outputs"));
    }

    #[test]
    fn roundtrips_through_toml() {
        let mut config = Config::default();
        config.browser_engine = true;
        config.output_dir = PathBuf::from("/tmp/produtos");
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert!(back.browser_engine);
        assert_eq!(back.output_dir, PathBuf::from("/tmp/produtos"));
    }
}
