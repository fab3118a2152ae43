//! Runtime configuration for taskdeck.
//!
//! Settings resolve in layers: `<data_dir>/config.toml` first, then the
//! environment on top (`API_BASE_URL`, `API_MOCK`). The literal base URL
//! `"mock"` is a sentinel that forces simulated mode regardless of the flag.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";

/// Base URL sentinel selecting the simulated backend.
pub const MOCK_SENTINEL: &str = "mock";

const STORE_FILE: &str = "store.json";
const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Remote backend root, e.g. `http://localhost:8000/api`.
    pub base_url: String,
    /// True when the simulated backend is selected.
    pub mock: bool,
    /// Directory holding the credential store and optional config file.
    pub data_dir: PathBuf,
}

/// Optional on-disk layer (`config.toml`).
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    base_url: Option<String>,
    mock: Option<bool>,
}

impl ApiConfig {
    /// Resolve configuration from `.env`, the environment, and the data dir.
    ///
    /// `TASKDECK_DATA_DIR` overrides the platform data directory; tests rely
    /// on that to stay isolated.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let data_dir = match std::env::var("TASKDECK_DATA_DIR") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::data_dir()
                .map(|d| d.join("taskdeck"))
                .unwrap_or_else(|| PathBuf::from(".taskdeck")),
        };

        Self::load(&data_dir)
    }

    /// Resolve configuration against an explicit data directory.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let file = Self::read_file_layer(&data_dir.join(CONFIG_FILE))?;

        let base_url = std::env::var("API_BASE_URL")
            .ok()
            .filter(|v| !v.is_empty())
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let env_mock = std::env::var("API_MOCK").ok().map(|v| v == "1");
        let mock_flag = env_mock.or(file.mock).unwrap_or(false);

        Ok(Self::resolve(base_url, mock_flag, data_dir.to_path_buf()))
    }

    fn resolve(base_url: String, mock_flag: bool, data_dir: PathBuf) -> Self {
        let mock = mock_flag || base_url == MOCK_SENTINEL;
        Self {
            base_url,
            mock,
            data_dir,
        }
    }

    fn read_file_layer(path: &Path) -> Result<FileConfig> {
        if !path.exists() {
            return Ok(FileConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file at {}", path.display()))
    }

    /// Path of the durable credential store.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE)
    }

    pub fn ensure_data_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir).with_context(|| {
            format!("Failed to create data directory {}", self.data_dir.display())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_defaults_to_remote_mode() {
        let cfg = ApiConfig::resolve(DEFAULT_BASE_URL.to_string(), false, PathBuf::from("/tmp/x"));
        assert!(!cfg.mock);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_resolve_mock_flag_enables_simulated_mode() {
        let cfg = ApiConfig::resolve(DEFAULT_BASE_URL.to_string(), true, PathBuf::from("/tmp/x"));
        assert!(cfg.mock);
    }

    #[test]
    fn test_resolve_mock_sentinel_overrides_flag() {
        let cfg = ApiConfig::resolve(MOCK_SENTINEL.to_string(), false, PathBuf::from("/tmp/x"));
        assert!(cfg.mock, "base_url == \"mock\" must force simulated mode");
    }

    #[test]
    fn test_file_layer_parses_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = \"http://10.0.0.5:9000/api\"\nmock = true\n").unwrap();
        let file = ApiConfig::read_file_layer(&path).unwrap();
        assert_eq!(file.base_url.as_deref(), Some("http://10.0.0.5:9000/api"));
        assert_eq!(file.mock, Some(true));
    }

    #[test]
    fn test_file_layer_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let file = ApiConfig::read_file_layer(&dir.path().join("config.toml")).unwrap();
        assert!(file.base_url.is_none());
        assert!(file.mock.is_none());
    }

    #[test]
    fn test_file_layer_rejects_invalid_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "base_url = [not toml").unwrap();
        assert!(ApiConfig::read_file_layer(&path).is_err());
    }

    #[test]
    fn test_store_path_lives_in_data_dir() {
        let cfg = ApiConfig::resolve(MOCK_SENTINEL.to_string(), false, PathBuf::from("/data/td"));
        assert_eq!(cfg.store_path(), PathBuf::from("/data/td/store.json"));
    }
}
