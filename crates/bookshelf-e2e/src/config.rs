//! Test configuration.
//!
//! Sources, lowest priority first:
//! 1. built-in defaults
//! 2. `bookshelf.toml` in the working directory (or an explicit path)
//! 3. `BOOKSHELF_*` environment variables (`BOOKSHELF_HEADLESS=false`, ...)
//! 4. `BASE_URL`
//!
//! The configuration is loaded once and handed to the page object; nothing
//! downstream reads the process environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use bookshelf_browser::TestBrowserConfig;
use figment::{
    providers::{Env, Format as _, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_FILE: &str = "bookshelf.toml";
pub const ENV_PREFIX: &str = "BOOKSHELF_";
pub const BASE_URL_VAR: &str = "BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct E2eConfig {
    /// Catalog page every scenario starts from.
    pub base_url: Option<String>,
    pub headless: bool,
    pub chrome_path: Option<String>,
    /// Bound for locator auto-waits and `expect` retries.
    pub expect_timeout_ms: u64,
    /// Bound for a whole scenario, per attempt.
    pub test_timeout_ms: u64,
    /// Extra attempts after a failure.
    pub retries: u32,
    pub screenshot_on_failure: bool,
    pub artifacts_dir: PathBuf,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            headless: true,
            chrome_path: None,
            expect_timeout_ms: 5_000,
            test_timeout_ms: 60_000,
            retries: if running_on_ci() { 2 } else { 0 },
            screenshot_on_failure: true,
            artifacts_dir: PathBuf::from("test-results"),
        }
    }
}

fn running_on_ci() -> bool {
    std::env::var_os("CI").is_some_and(|v| !v.is_empty())
}

impl E2eConfig {
    /// Loads from the default sources, picking up `bookshelf.toml` when it
    /// exists.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Loads with an explicit config file instead of `bookshelf.toml`.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Ok(Self::figment(config_path).extract()?)
    }

    /// The layered provider, exposed so callers can merge overrides on top.
    pub fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = config_path.map(Path::to_path_buf).or_else(|| {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            default_path.exists().then(|| default_path.to_path_buf())
        });

        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Env::raw().only(&[BASE_URL_VAR]))
    }

    /// The configured base URL, validated.
    ///
    /// Fails when the value is missing, blank, or not an absolute URL.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        let raw = self
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
            value: raw.to_string(),
            reason: e.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn expect_timeout(&self) -> Duration {
        Duration::from_millis(self.expect_timeout_ms)
    }

    pub fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout_ms)
    }

    pub fn browser_config(&self) -> TestBrowserConfig {
        TestBrowserConfig::new()
            .with_headless(self.headless)
            .with_chrome_path(self.chrome_path.clone())
            .with_action_timeout(self.expect_timeout())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::TempDir;

    fn clear_env() {
        // SAFETY: tests touching the environment are serialized.
        unsafe {
            std::env::remove_var(BASE_URL_VAR);
            std::env::remove_var("BOOKSHELF_HEADLESS");
            std::env::remove_var("BOOKSHELF_EXPECT_TIMEOUT_MS");
            std::env::remove_var("CI");
        }
    }

    #[test]
    #[serial]
    fn defaults_when_nothing_is_configured() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let config = E2eConfig::load_from(Some(&temp.path().join("missing.toml"))).unwrap();

        assert_eq!(config.base_url, None);
        assert!(config.headless);
        assert_eq!(config.expect_timeout(), Duration::from_secs(5));
        assert_eq!(config.test_timeout(), Duration::from_secs(60));
        assert_eq!(config.retries, 0);
        assert!(matches!(config.base_url(), Err(ConfigError::MissingBaseUrl)));
    }

    #[test]
    #[serial]
    fn file_is_overridden_by_environment() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bookshelf.toml");
        fs::write(
            &path,
            r#"
            base_url = "http://file.example/books"
            headless = false
            expect_timeout_ms = 2000
            "#,
        )
        .unwrap();

        let from_file = E2eConfig::load_from(Some(&path)).unwrap();
        assert_eq!(from_file.base_url.as_deref(), Some("http://file.example/books"));
        assert!(!from_file.headless);
        assert_eq!(from_file.expect_timeout_ms, 2000);

        // SAFETY: serialized test.
        unsafe {
            std::env::set_var(BASE_URL_VAR, "http://env.example/books");
            std::env::set_var("BOOKSHELF_HEADLESS", "true");
        }
        let config = E2eConfig::load_from(Some(&path)).unwrap();
        clear_env();

        assert_eq!(config.base_url().unwrap().as_str(), "http://env.example/books");
        assert!(config.headless);
        assert_eq!(config.expect_timeout_ms, 2000);
    }

    #[test]
    #[serial]
    fn ci_enables_retries() {
        clear_env();
        // SAFETY: serialized test.
        unsafe { std::env::set_var("CI", "true") };
        let config = E2eConfig::default();
        clear_env();

        assert_eq!(config.retries, 2);
    }

    #[test]
    fn blank_base_url_counts_as_missing() {
        let config = E2eConfig::default().with_base_url("   ");
        assert!(matches!(config.base_url(), Err(ConfigError::MissingBaseUrl)));
    }

    #[test]
    fn relative_base_url_is_rejected() {
        let config = E2eConfig::default().with_base_url("/books");
        assert!(matches!(
            config.base_url(),
            Err(ConfigError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn browser_config_follows_settings() {
        let config = E2eConfig {
            headless: false,
            expect_timeout_ms: 1234,
            ..E2eConfig::default()
        };
        let browser = config.browser_config();

        assert!(!browser.headless);
        assert_eq!(browser.action_timeout, Duration::from_millis(1234));
    }
}
