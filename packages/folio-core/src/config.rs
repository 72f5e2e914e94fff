//! Runtime settings and their persistence.

use crate::prices::MissingValuePolicy;
use crate::provider::{
    AlphaVantageProvider, CachingProvider, CsvProvider, MarketDataProvider, RetryPolicy,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Which market data source to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    AlphaVantage,
    Csv,
}

/// User settings, stored as JSON.
///
/// Default path: `<config dir>/folio/settings.json`
/// Can be overridden with the `FOLIO_SETTINGS_FILE` environment variable.
/// `ALPHA_VANTAGE_API_KEY` and `FOLIO_DATA_DIR` override the file's values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub provider: ProviderKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Directory of `<SYMBOL>.csv` files for the CSV provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Annual risk-free rate as a fraction
    pub risk_free_rate: f64,
    pub initial_capital: f64,
    /// Trailing window for backtests; `None` uses the full history
    pub lookback_years: Option<u32>,
    pub missing_values: MissingValuePolicy,
    pub retry: RetryPolicy,
    /// Minimum spacing between Alpha Vantage calls
    pub min_request_interval_ms: u64,
    pub cache_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            api_key: None,
            data_dir: None,
            risk_free_rate: 0.0,
            initial_capital: 10_000.0,
            lookback_years: Some(5),
            missing_values: MissingValuePolicy::default(),
            retry: RetryPolicy::default(),
            min_request_interval_ms: 12_000,
            cache_ttl_secs: 3600,
        }
    }
}

impl Settings {
    /// Get the default settings file path.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("FOLIO_SETTINGS_FILE") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("folio/settings.json"))
            .unwrap_or_else(|| PathBuf::from("settings.json"))
    }

    /// Load from the default path and apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from_path(&Self::default_path())?;
        settings.apply_overrides(|key| env::var(key).ok());
        settings.validate()?;
        Ok(settings)
    }

    /// Load from a specific path. A missing file yields defaults.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            Error::ConfigurationError(format!("Invalid settings file {}: {}", path.display(), e))
        })
    }

    /// Save to a specific path, creating parent directories.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Apply `ALPHA_VANTAGE_API_KEY` / `FOLIO_DATA_DIR` from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("ALPHA_VANTAGE_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(dir) = lookup("FOLIO_DATA_DIR").filter(|d| !d.trim().is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(Error::ConfigurationError(
                "risk_free_rate must be a finite number".to_string(),
            ));
        }
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(Error::ConfigurationError(
                "initial_capital must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn min_request_interval(&self) -> Duration {
        Duration::from_millis(self.min_request_interval_ms)
    }

    /// Copy safe to print: the API key is masked.
    pub fn redacted(&self) -> Self {
        Self {
            api_key: self.api_key.as_ref().map(|_| "***".to_string()),
            ..self.clone()
        }
    }

    /// Build the configured provider, wrapped with cache and retry.
    pub fn build_provider(&self) -> Result<Box<dyn MarketDataProvider>> {
        let ttl = self.cache_ttl();
        match self.provider {
            ProviderKind::AlphaVantage => {
                let key = self.api_key.clone().ok_or_else(|| {
                    Error::ConfigurationError(
                        "Alpha Vantage needs an API key (set ALPHA_VANTAGE_API_KEY)".to_string(),
                    )
                })?;
                let inner = AlphaVantageProvider::new(key);
                Ok(Box::new(
                    CachingProvider::new(inner, ttl, self.retry)
                        .with_min_interval(self.min_request_interval()),
                ))
            }
            ProviderKind::Csv => {
                let dir = self.data_dir.clone().ok_or_else(|| {
                    Error::ConfigurationError(
                        "CSV provider needs a data directory (set FOLIO_DATA_DIR)".to_string(),
                    )
                })?;
                Ok(Box::new(CachingProvider::new(CsvProvider::new(dir), ttl, self.retry)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Backoff;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.provider, ProviderKind::AlphaVantage);
        assert_eq!(settings.initial_capital, 10_000.0);
        assert_eq!(settings.lookback_years, Some(5));
        assert_eq!(settings.missing_values, MissingValuePolicy::ForwardFill);
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.min_request_interval(), Duration::from_secs(12));
        assert_eq!(settings.cache_ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from_path(&dir.path().join("nope.json")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"provider":"csv","data_dir":"/data","risk_free_rate":0.02,
                "retry":{"max_attempts":5,"backoff":{"kind":"fixed","delay_ms":100}}}"#,
        )
        .unwrap();

        let settings = Settings::load_from_path(&path).unwrap();

        assert_eq!(settings.provider, ProviderKind::Csv);
        assert_eq!(settings.data_dir, Some(PathBuf::from("/data")));
        assert_eq!(settings.risk_free_rate, 0.02);
        assert_eq!(settings.initial_capital, 10_000.0);
        assert_eq!(settings.min_request_interval_ms, 12_000);
        assert_eq!(
            settings.retry,
            RetryPolicy::new(5, Backoff::Fixed { delay_ms: 100 })
        );
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/settings.json");

        let settings = Settings {
            lookback_years: None,
            initial_capital: 2_500.0,
            ..Default::default()
        };
        settings.save_to_path(&path).unwrap();

        assert_eq!(Settings::load_from_path(&path).unwrap(), settings);
    }

    #[test]
    fn test_invalid_file_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"provider":"yahoo"}"#).unwrap();

        assert!(matches!(
            Settings::load_from_path(&path),
            Err(Error::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_overrides_and_redaction() {
        let mut settings = Settings::default();
        settings.apply_overrides(|key| match key {
            "ALPHA_VANTAGE_API_KEY" => Some("secret".to_string()),
            "FOLIO_DATA_DIR" => Some(String::new()),
            _ => None,
        });

        assert_eq!(settings.api_key.as_deref(), Some("secret"));
        assert_eq!(settings.data_dir, None);
        assert_eq!(settings.redacted().api_key.as_deref(), Some("***"));
    }

    #[test]
    fn test_validate() {
        let bad = Settings {
            initial_capital: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(Error::ConfigurationError(_))));
        assert!(Settings::default().validate().is_ok());
    }

    #[test]
    fn test_build_provider_requires_credentials() {
        let settings = Settings::default();
        assert!(matches!(
            settings.build_provider(),
            Err(Error::ConfigurationError(_))
        ));

        let csv = Settings {
            provider: ProviderKind::Csv,
            data_dir: Some(PathBuf::from("/tmp")),
            ..Default::default()
        };
        assert_eq!(csv.build_provider().unwrap().id(), "CSV");
    }
}
