use crate::core::{ConfigProvider, ListingKind, OutputFormat, DEFAULT_PAGE_SIZE};
use crate::utils::error::{FeedError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub feed: FeedInfo,
    pub source: SourceConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    pub output: OutputConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub endpoint: Option<String>,
    pub input_file: Option<String>,
    pub kind: Option<ListingKind>,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RankingConfig {
    pub page_size: Option<usize>,
    pub seed: Option<u64>,
    pub category: Option<String>,
    pub only_kind: Option<ListingKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub formats: Vec<OutputFormat>,
    #[serde(default)]
    pub split_pages: bool,
    #[serde(default)]
    pub compress: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_json: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| FeedError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${ATLAS_API})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FeedError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn feed_name(&self) -> &str {
        &self.feed.name
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_json(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_json)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn source_endpoint(&self) -> Option<&str> {
        self.source.endpoint.as_deref()
    }

    fn input_file(&self) -> Option<&str> {
        self.source.input_file.as_deref()
    }

    fn listing_kind(&self) -> ListingKind {
        self.source.kind.unwrap_or(ListingKind::Product)
    }

    fn category(&self) -> Option<&str> {
        self.ranking.category.as_deref()
    }

    fn kind_filter(&self) -> Option<ListingKind> {
        self.ranking.only_kind
    }

    fn page_size(&self) -> usize {
        self.ranking.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    fn shuffle_seed(&self) -> Option<u64> {
        self.ranking.seed
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_formats(&self) -> &[OutputFormat] {
        &self.output.formats
    }

    fn split_pages(&self) -> bool {
        self.output.split_pages
    }

    fn compress(&self) -> bool {
        self.output.compress
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(
            self.source
                .timeout_seconds
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        )
    }

    fn retry_attempts(&self) -> u32 {
        self.source.retry_attempts.unwrap_or(DEFAULT_RETRY_ATTEMPTS)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("feed.name", &self.feed.name)?;
        validation::validate_single_source(
            self.source.endpoint.as_deref(),
            self.source.input_file.as_deref(),
        )?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_positive_number("ranking.page_size", self.page_size(), 1)?;
        validation::validate_positive_number("output.formats", self.output.formats.len(), 1)?;
        validation::validate_range(
            "source.timeout_seconds",
            self.request_timeout().as_secs(),
            1,
            600,
        )?;
        validation::validate_range("source.retry_attempts", self.retry_attempts(), 0, 10)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[feed]
name = "products-feed"

[source]
endpoint = "https://api.atlas.test/api/v2/product/get-all-products"

[output]
path = "./feed-output"
formats = ["json"]
"#;

    #[test]
    fn test_parse_basic_toml_config() {
        let config = TomlConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.feed_name(), "products-feed");
        assert_eq!(
            config.source_endpoint(),
            Some("https://api.atlas.test/api/v2/product/get-all-products")
        );
        assert_eq!(config.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(config.listing_kind(), ListingKind::Product);
        assert_eq!(config.retry_attempts(), DEFAULT_RETRY_ATTEMPTS);
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[feed]
name = "events-feed"
description = "Upcoming shop events"

[source]
input_file = "events.json"
kind = "event"
timeout_seconds = 5
retry_attempts = 0

[ranking]
page_size = 20
seed = 1234
category = "Music"
only_kind = "event"

[output]
path = "./out"
formats = ["json", "csv"]
split_pages = true
compress = true

[monitoring]
enabled = true
log_json = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.input_file(), Some("events.json"));
        assert_eq!(config.listing_kind(), ListingKind::Event);
        assert_eq!(config.kind_filter(), Some(ListingKind::Event));
        assert_eq!(config.page_size(), 20);
        assert_eq!(config.shuffle_seed(), Some(1234));
        assert_eq!(config.category(), Some("Music"));
        assert_eq!(config.output_formats(), &[OutputFormat::Json, OutputFormat::Csv]);
        assert!(config.split_pages());
        assert!(config.compress());
        assert!(config.monitoring_enabled());
        assert!(config.log_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ATLAS_FEED_TEST_API", "https://env.atlas.test");

        let toml_content = r#"
[feed]
name = "env"

[source]
endpoint = "${ATLAS_FEED_TEST_API}/products"

[output]
path = "./output"
formats = ["csv"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.source_endpoint(),
            Some("https://env.atlas.test/products")
        );

        std::env::remove_var("ATLAS_FEED_TEST_API");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[feed]
name = "bad"

[source]
endpoint = "invalid-url"

[output]
path = "./output"
formats = ["json"]
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let zero_page = BASIC.replace("[output]", "[ranking]\npage_size = 0\n\n[output]");
        let config = TomlConfig::from_toml_str(&zero_page).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_format_is_a_parse_error() {
        let content = BASIC.replace(r#"formats = ["json"]"#, r#"formats = ["xml"]"#);
        let err = TomlConfig::from_toml_str(&content).unwrap_err();
        assert!(matches!(err, FeedError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.feed_name(), "products-feed");
    }
}
