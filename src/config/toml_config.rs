use crate::domain::conflict::POLICY_NAMES;
use crate::utils::error::{QuoteError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_path, validate_positive_number,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "quote-sync.toml";
pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/posts";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub endpoint: String,
    pub interval_seconds: u64,
    pub timeout_seconds: u64,
    pub category: String,
    pub conflict_policy: String,
    pub max_items: Option<usize>,
    pub publish_new_quotes: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            interval_seconds: 30,
            timeout_seconds: 10,
            category: "General".to_string(),
            conflict_policy: "remote-wins".to_string(),
            max_items: None,
            publish_new_quotes: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Option<String>,
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| QuoteError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 指定路徑必須存在；未指定時讀取預設檔案，沒有就用預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// 替換環境變數 (例如 ${QUOTE_SYNC_ENDPOINT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| {
            QuoteError::ConfigValidationError {
                field: "env_substitution".to_string(),
                message: e.to_string(),
            }
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync.interval_seconds)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.timeout_seconds)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_path("storage.data_dir", &self.storage.data_dir)?;
        validate_url("sync.endpoint", &self.sync.endpoint)?;
        validate_positive_number("sync.interval_seconds", self.sync.interval_seconds, 1)?;
        validate_positive_number("sync.timeout_seconds", self.sync.timeout_seconds, 1)?;
        validate_non_empty_string("sync.category", &self.sync.category)?;
        validate_one_of("sync.conflict_policy", &self.sync.conflict_policy, &POLICY_NAMES)?;

        if let Some(max_items) = self.sync.max_items {
            validate_positive_number("sync.max_items", max_items as u64, 1)?;
        }

        if let Some(level) = &self.logging.level {
            validate_one_of(
                "logging.level",
                level,
                &["trace", "debug", "info", "warn", "error"],
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.sync.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.sync_interval(), Duration::from_secs(30));
        assert_eq!(config.sync.category, "General");
        assert_eq!(config.sync.conflict_policy, "remote-wins");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[storage]
data_dir = "/tmp/quotes"

[sync]
endpoint = "https://api.example.com/posts"
interval_seconds = 60
timeout_seconds = 5
category = "Server"
conflict_policy = "keep-local"
max_items = 10
publish_new_quotes = true

[logging]
level = "debug"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.storage.data_dir, "/tmp/quotes");
        assert_eq!(config.sync.interval_seconds, 60);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(config.sync.max_items, Some(10));
        assert!(config.sync.publish_new_quotes);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("QUOTE_SYNC_TEST_ENDPOINT", "https://test.api.com/posts");

        let toml_content = r#"
[sync]
endpoint = "${QUOTE_SYNC_TEST_ENDPOINT}"
"#;

        let config = AppConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.sync.endpoint, "https://test.api.com/posts");

        std::env::remove_var("QUOTE_SYNC_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let invalid = [
            "[sync]\nendpoint = \"invalid-url\"",
            "[sync]\ninterval_seconds = 0",
            "[sync]\nconflict_policy = \"newest\"",
            "[sync]\ncategory = \" \"",
            "[logging]\nlevel = \"loud\"",
        ];

        for content in invalid {
            let config = AppConfig::from_toml_str(content).unwrap();
            assert!(config.validate().is_err(), "expected invalid: {}", content);
        }
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let err = AppConfig::from_toml_str("[sync\nendpoint = 1").unwrap_err();
        assert!(matches!(err, QuoteError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[storage]\ndata_dir = \"./file-data\"\n")
            .unwrap();

        let config = AppConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.storage.data_dir, "./file-data");
    }
}
