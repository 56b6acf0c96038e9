use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.blockkeeper.io/v1";
pub const DEFAULT_MAX_CHAR: usize = 30;
pub const DEFAULT_STORAGE_PATH: &str = "data/storage.json";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { url: default_api_url() }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ValidationConfig {
    #[serde(default = "default_max_char")]
    pub max_char: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { max_char: DEFAULT_MAX_CHAR }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: default_storage_path() }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: default_log_format() }
    }
}

fn default_api_url() -> String { DEFAULT_API_URL.to_string() }
fn default_max_char() -> usize { DEFAULT_MAX_CHAR }
fn default_storage_path() -> String { DEFAULT_STORAGE_PATH.to_string() }
fn default_log_format() -> String { "compact".to_string() }

/// Load `.env`, then the file named by `CONFIG_PATH` (default `config.toml`).
pub fn load_default() -> Result<AppConfig> {
    dotenvy::dotenv().ok();
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Like [`AppConfig::load_and_validate`], but a missing or unreadable
    /// config file yields the defaults. Invalid values are still errors.
    pub fn load_or_default() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) => {
                debug!(error = %e, "config file not loaded; using defaults");
                AppConfig::default()
            }
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.api.normalize()?;
        self.validation.validate()?;
        self.storage.normalize();
        Ok(())
    }
}

impl ApiConfig {
    fn normalize(&mut self) -> Result<()> {
        let trimmed = self.url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            self.url = default_api_url();
            return Ok(());
        }
        let lower = trimmed.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("api.url must start with http:// or https://"));
        }
        self.url = trimmed.to_string();
        Ok(())
    }
}

impl ValidationConfig {
    fn validate(&self) -> Result<()> {
        if self.max_char == 0 {
            return Err(anyhow!("validation.max_char must be >= 1"));
        }
        Ok(())
    }
}

impl StorageConfig {
    fn normalize(&mut self) {
        if self.path.trim().is_empty() {
            self.path = default_storage_path();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_public_api() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api.url, "https://api.blockkeeper.io/v1");
        assert_eq!(cfg.validation.max_char, 30);
        assert_eq!(cfg.logging.format, "compact");
    }

    #[test]
    fn partial_toml_fills_defaults() -> Result<()> {
        let mut cfg: AppConfig = toml::from_str("[api]\nurl = \"http://localhost:9000/v1/\"\n")?;
        cfg.normalize_and_validate()?;
        assert_eq!(cfg.api.url, "http://localhost:9000/v1");
        assert_eq!(cfg.validation.max_char, 30);
        assert_eq!(cfg.storage.path, DEFAULT_STORAGE_PATH);
        Ok(())
    }

    #[test]
    fn rejects_bad_values() {
        let mut cfg = AppConfig::default();
        cfg.api.url = "ftp://example.com".into();
        assert!(cfg.normalize_and_validate().is_err());

        let mut cfg = AppConfig::default();
        cfg.validation.max_char = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() -> Result<()> {
        std::env::set_var("CONFIG_PATH", "/nonexistent-config-for-tests.toml");
        let cfg = AppConfig::load_or_default()?;
        assert_eq!(cfg, AppConfig::default());
        assert!(AppConfig::load_and_validate().is_err());
        Ok(())
    }

    #[test]
    fn load_from_file_reads_toml() -> Result<()> {
        let path = std::env::temp_dir().join(format!("keeper_cfg_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, "[validation]\nmax_char = 12\n[logging]\nformat = \"json\"\n")?;
        let cfg = load_from_file(&path.to_string_lossy())?;
        assert_eq!(cfg.validation.max_char, 12);
        assert_eq!(cfg.logging.format, "json");
        let _ = std::fs::remove_file(&path);
        Ok(())
    }
}
