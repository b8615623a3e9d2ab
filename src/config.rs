use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Engine configuration with built-in defaults.
///
/// All knobs are plain named fields; callers construct one (or deserialize
/// it from JSON) and hand it to the engine instead of the engine reaching
/// for ambient settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Default result cap applied when a query does not set its own limit
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,

    /// Default fuzzy-search toggle for queries built from user input
    #[serde(default = "default_fuzzy_search")]
    pub fuzzy_search: bool,

    /// Default case-sensitivity toggle
    #[serde(default = "default_case_sensitive")]
    pub case_sensitive: bool,

    /// Maximum number of cached result sets
    #[serde(default = "default_cache_max_size")]
    pub cache_max_size: usize,

    /// Cache entry time-to-live, in seconds
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Attempts for the load pipeline and each search call
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Fixed delay between retry attempts, in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_result_limit() -> usize {
    1000
}

fn default_fuzzy_search() -> bool {
    false
}

fn default_case_sensitive() -> bool {
    false
}

fn default_cache_max_size() -> usize {
    1000
}

fn default_cache_ttl_secs() -> u64 {
    30 * 60
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    150
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_limit: default_result_limit(),
            fuzzy_search: default_fuzzy_search(),
            case_sensitive: default_case_sensitive(),
            cache_max_size: default_cache_max_size(),
            cache_ttl_secs: default_cache_ttl_secs(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl SearchConfig {
    /// Load config from a JSON file, or return defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path).context("Failed to read config file")?;
            let config: SearchConfig =
                serde_json::from_str(&content).context("Failed to parse config file")?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::default();
        assert_eq!(config.result_limit, 1000);
        assert_eq!(config.cache_max_size, 1000);
        assert_eq!(config.cache_ttl(), Duration::from_secs(1800));
        assert_eq!(config.retry_attempts, 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"result_limit": 50}"#;
        let config: SearchConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.result_limit, 50);
        assert_eq!(config.cache_max_size, 1000);
        assert!(!config.case_sensitive);
    }

    #[test]
    fn test_empty_json_is_all_defaults() {
        let config: SearchConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.cache_ttl_secs, 1800);
    }
}
