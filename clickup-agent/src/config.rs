use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use serde_with::serde_as;
use strum::{Display, EnumString};

use crate::domain::content::ImageBudget;
use crate::domain::search::{BoostOptions, FuzzyOptions, PagePolicy, SearchConfig};

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub clickup: ClickUpSettings,
    pub search: SearchSettings,
    pub images: ImageSettings,
}

#[derive(Deserialize, Clone)]
pub struct ClickUpSettings {
    pub api_url: String,
    pub api_token: String,
    pub team_id: String,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct SearchSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub cache_ttl_secs: u64,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub cache_capacity: u64,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub filtered_page_ceiling: u32,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub unfiltered_page_ceiling: u32,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub page_concurrency: usize,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub fuzzy_threshold: f64,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub min_match_len: usize,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_field_chars: usize,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub default_limit: usize,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_limit: usize,
}

#[serde_as]
#[derive(Deserialize, Clone, Debug)]
pub struct ImageSettings {
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_count: usize,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub max_size_mb: f64,
    #[serde_as(as = "serde_with::DisplayFromStr")]
    pub request_timeout_secs: u64,
}

impl SearchSettings {
    pub fn to_search_config(&self) -> SearchConfig {
        SearchConfig {
            default_limit: self.default_limit,
            max_limit: self.max_limit,
            fuzzy: FuzzyOptions {
                threshold: self.fuzzy_threshold,
                min_match_len: self.min_match_len,
                max_field_chars: self.max_field_chars,
            },
            boost: BoostOptions::default(),
            pages: PagePolicy {
                filtered_ceiling: self.filtered_page_ceiling,
                unfiltered_ceiling: self.unfiltered_page_ceiling,
                concurrency: self.page_concurrency,
            },
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            cache_capacity: self.cache_capacity,
        }
    }
}

impl ImageSettings {
    pub fn budget(&self) -> ImageBudget {
        ImageBudget::from_megabytes(self.max_count, self.max_size_mb)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Directory holding `base.yaml` and the per-environment files.
pub fn config_directory() -> Result<PathBuf, config::ConfigError> {
    if let Ok(dir) = std::env::var("APP_CONFIG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {e}"))
    })?;
    Ok(base_path.join("config"))
}

pub fn read_config() -> Result<Settings, config::ConfigError> {
    let config_directory = config_directory()?;

    let environment = Environment::from_str(
        std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .as_str(),
    )
    .map_err(|e| config::ConfigError::Message(format!("Failed to parse APP_ENVIRONMENT: {e}")))?;
    let environment_filename = format!("{}.yaml", environment);

    let settings = config::Config::builder()
        .add_source(config::File::from(config_directory.join("base.yaml")))
        .add_source(
            config::File::from(config_directory.join(environment_filename)).required(false),
        )
        .add_source(
            config::Environment::with_prefix("CLICKUP_AGENT")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[derive(Display, Debug, EnumString, PartialEq, Eq)]
pub enum Environment {
    #[strum(ascii_case_insensitive, serialize = "local")]
    Local,
    #[strum(ascii_case_insensitive, serialize = "production")]
    Production,
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    const BASE: &str = r#"
clickup:
  api_url: "https://api.clickup.com/api"
  api_token: "pk_test"
  team_id: "9012"
search:
  cache_ttl_secs: 60
  cache_capacity: 256
  filtered_page_ceiling: 10
  unfiltered_page_ceiling: 30
  page_concurrency: 5
  fuzzy_threshold: 0.4
  min_match_len: 2
  max_field_chars: 2000
  default_limit: 50
  max_limit: 200
images:
  max_count: 4
  max_size_mb: 1.5
  request_timeout_secs: 20
"#;

    fn settings(extra: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(BASE, FileFormat::Yaml))
            .add_source(File::from_str(extra, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!(Environment::from_str("Production").unwrap(), Environment::Production);
        assert_eq!(Environment::Local.to_string(), "local");
        assert!(Environment::from_str("staging").is_err());
    }

    #[test]
    fn search_settings_map_to_service_config() {
        let config = settings("").search.to_search_config();
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.pages.filtered_ceiling, 10);
        assert_eq!(config.pages.unfiltered_ceiling, 30);
        assert_eq!(config.fuzzy.threshold, 0.4);
        assert_eq!(config.max_limit, 200);
        assert_eq!(config.cache_capacity, 256);
        assert_eq!(config.fuzzy.max_field_chars, 2000);
    }

    #[test]
    fn environment_file_overrides_base() {
        let settings = settings("search:\n  cache_ttl_secs: \"5\"\n");
        assert_eq!(settings.search.cache_ttl_secs, 5);
        assert_eq!(settings.search.max_limit, 200);
    }

    #[test]
    fn image_budget_is_in_bytes() {
        let images = settings("").images;
        assert_eq!(images.budget(), ImageBudget::new(4, 1_572_864));
        assert_eq!(images.request_timeout(), Duration::from_secs(20));
    }
}
