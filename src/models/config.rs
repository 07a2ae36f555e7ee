//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::LayoutSelectors;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog location and browser connection
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// On-disk tree settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Settle delays used while the page renders
    #[serde(default)]
    pub timing: TimingConfig,

    /// Document download settings
    #[serde(default)]
    pub transfer: TransferConfig,

    /// XPath locations of the catalog page elements
    #[serde(default)]
    pub layout: LayoutSelectors,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.catalog.start_url)?;
        url::Url::parse(&self.catalog.webdriver_url)?;

        if self.storage.root_dir.as_os_str().is_empty() {
            return Err(AppError::validation("storage.root_dir is empty"));
        }
        if self.transfer.user_agent.trim().is_empty() {
            return Err(AppError::validation("transfer.user_agent is empty"));
        }
        if self.transfer.timeout_secs == 0 {
            return Err(AppError::validation("transfer.timeout_secs must be > 0"));
        }
        self.timing.validate()?;
        self.layout.validate()?;
        Ok(())
    }
}

/// Catalog page and WebDriver endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Search page listing every institution
    #[serde(default = "defaults::start_url")]
    pub start_url: String,

    /// Address of a running WebDriver server (chromedriver)
    #[serde(default = "defaults::webdriver_url")]
    pub webdriver_url: String,

    /// Run the browser without a visible window
    #[serde(default = "defaults::headless")]
    pub headless: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            start_url: defaults::start_url(),
            webdriver_url: defaults::webdriver_url(),
            headless: defaults::headless(),
        }
    }
}

/// Content store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root of the institution tree
    #[serde(default = "defaults::root_dir")]
    pub root_dir: PathBuf,

    /// Smallest document size accepted as a finished download
    #[serde(default = "defaults::min_document_bytes")]
    pub min_document_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: defaults::root_dir(),
            min_document_bytes: defaults::min_document_bytes(),
        }
    }
}

/// Upper bound for a single settle delay, fixed part plus jitter.
pub const MAX_SETTLE_SECS: f64 = 3600.0;

/// A fixed delay followed by a uniformly drawn jitter in `[jitter_min, jitter_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Settle {
    pub fixed_secs: f64,
    #[serde(default)]
    pub jitter_min_secs: f64,
    #[serde(default)]
    pub jitter_max_secs: f64,
}

impl Settle {
    pub const fn fixed(secs: f64) -> Self {
        Self {
            fixed_secs: secs,
            jitter_min_secs: 0.0,
            jitter_max_secs: 0.0,
        }
    }

    pub const fn jittered(secs: f64, min: f64, max: f64) -> Self {
        Self {
            fixed_secs: secs,
            jitter_min_secs: min,
            jitter_max_secs: max,
        }
    }

    /// Draw the total delay for one pause.
    ///
    /// Fails instead of panicking when the configured seconds do not form a
    /// representable duration (negative, non-finite or overflowing).
    pub fn sample(&self) -> Result<Duration> {
        use rand::Rng;

        let (min, max) = (self.jitter_min_secs, self.jitter_max_secs);
        let jitter = if max > min && (max - min).is_finite() {
            rand::thread_rng().gen_range(min..max)
        } else {
            min
        };
        let secs = self.fixed_secs + jitter;
        Duration::try_from_secs_f64(secs)
            .map_err(|e| AppError::validation(format!("settle delay of {secs}s: {e}")))
    }

    fn validate(&self, name: &str) -> Result<()> {
        let values = [self.fixed_secs, self.jitter_min_secs, self.jitter_max_secs];
        if values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(AppError::validation(format!(
                "timing.{name} must contain non-negative finite values"
            )));
        }
        if self.jitter_max_secs < self.jitter_min_secs {
            return Err(AppError::validation(format!(
                "timing.{name}.jitter_max_secs is below jitter_min_secs"
            )));
        }
        if self.fixed_secs + self.jitter_max_secs > MAX_SETTLE_SECS {
            return Err(AppError::validation(format!(
                "timing.{name} may not exceed {MAX_SETTLE_SECS} seconds in total"
            )));
        }
        Ok(())
    }
}

/// Settle delays inserted between browser interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// After the first page load
    #[serde(default = "defaults::initial_settle")]
    pub initial: Settle,

    /// Before probing for the cookie banner
    #[serde(default = "defaults::banner_probe")]
    pub banner_probe: Settle,

    /// After submitting an institution search
    #[serde(default = "defaults::search_settle")]
    pub search: Settle,

    /// After opening a program detail view
    #[serde(default = "defaults::detail_settle")]
    pub detail: Settle,

    /// After a document download finishes
    #[serde(default = "defaults::post_download")]
    pub post_download: Settle,

    /// After a row has been committed
    #[serde(default = "defaults::post_row")]
    pub post_row: Settle,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            initial: defaults::initial_settle(),
            banner_probe: defaults::banner_probe(),
            search: defaults::search_settle(),
            detail: defaults::detail_settle(),
            post_download: defaults::post_download(),
            post_row: defaults::post_row(),
        }
    }
}

impl TimingConfig {
    /// All delays set to zero. Used by tests and dry runs against local fixtures.
    pub fn immediate() -> Self {
        let zero = Settle::fixed(0.0);
        Self {
            initial: zero,
            banner_probe: zero,
            search: zero,
            detail: zero,
            post_download: zero,
            post_row: zero,
        }
    }

    fn validate(&self) -> Result<()> {
        self.initial.validate("initial")?;
        self.banner_probe.validate("banner_probe")?;
        self.search.validate("search")?;
        self.detail.validate("detail")?;
        self.post_download.validate("post_download")?;
        self.post_row.validate("post_row")
    }
}

/// HTTP settings for document downloads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    use super::Settle;

    pub fn start_url() -> String {
        "https://www.universitaly.it/index.php/cercacorsi/universita".into()
    }

    pub fn webdriver_url() -> String {
        "http://localhost:9515".into()
    }

    pub fn headless() -> bool {
        true
    }

    pub fn root_dir() -> PathBuf {
        PathBuf::from("universities")
    }

    pub fn min_document_bytes() -> u64 {
        1
    }

    pub fn initial_settle() -> Settle {
        Settle::fixed(2.0)
    }

    pub fn banner_probe() -> Settle {
        Settle::fixed(0.5)
    }

    pub fn search_settle() -> Settle {
        Settle::jittered(2.0, 2.0, 3.0)
    }

    pub fn detail_settle() -> Settle {
        Settle::jittered(2.0, 3.0, 4.0)
    }

    pub fn post_download() -> Settle {
        Settle::fixed(1.0)
    }

    pub fn post_row() -> Settle {
        Settle::fixed(1.0)
    }

    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; catalog-crawler/0.1)".into()
    }

    pub fn timeout() -> u64 {
        120
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            root_dir = "out"

            [timing.search]
            fixed_secs = 1.0
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.root_dir, PathBuf::from("out"));
        assert_eq!(config.storage.min_document_bytes, 1);
        assert_eq!(config.timing.search, Settle::fixed(1.0));
        assert_eq!(config.timing.detail, Settle::jittered(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_search_settle_within_bounds() {
        let settle = Settle::jittered(2.0, 2.0, 3.0);
        for _ in 0..50 {
            let secs = settle.sample().unwrap().as_secs_f64();
            assert!((4.0..5.0).contains(&secs), "sampled {secs}");
        }
    }

    #[test]
    fn test_inverted_jitter_rejected() {
        let mut config = Config::default();
        config.timing.detail = Settle::jittered(1.0, 4.0, 3.0);
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_oversized_settle_rejected() {
        let mut config = Config::default();
        config.timing.post_row = Settle::fixed(1e20);
        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
        assert!(Settle::fixed(1e20).sample().is_err());
    }

    #[test]
    fn test_negative_settle_fails_without_panic() {
        let config: Config = toml::from_str(
            r#"
            [timing.initial]
            fixed_secs = -1.0
            "#,
        )
        .unwrap();

        assert!(matches!(config.validate(), Err(AppError::Validation(_))));
        assert!(matches!(
            config.timing.initial.sample(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unbounded_jitter_fails_without_panic() {
        let settle = Settle::jittered(0.0, 0.0, f64::INFINITY);
        assert!(settle.validate("detail").is_err());
        assert!(settle.sample().is_ok());
        assert!(Settle::jittered(0.0, f64::NAN, 1.0).sample().is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/crawler.toml");
        assert_eq!(config.storage.root_dir, PathBuf::from("universities"));
    }
}
