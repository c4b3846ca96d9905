//! Image cache configuration.
//!
//! Values are resolved in order: built-in defaults, an optional TOML file,
//! then `MARQUEE_*` environment variables.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::constants::{
    APP_NAME, APP_ORGANIZATION, APP_QUALIFIER, DEFAULT_FETCH_TIMEOUT,
    DEFAULT_MEMORY_BUDGET, DEFAULT_USER_AGENT, IMAGE_CACHE_DIR_NAME,
};
use crate::error::{MediaError, Result};
use crate::units::ByteSize;

/// Overrides `cache_dir`. Blank values are ignored.
pub const ENV_CACHE_DIR: &str = "MARQUEE_CACHE_DIR";
/// Overrides `memory_budget`; accepts the same forms as the TOML field.
pub const ENV_MEMORY_BUDGET: &str = "MARQUEE_MEMORY_BUDGET";
/// A truthy value disables network fetching.
pub const ENV_OFFLINE: &str = "MARQUEE_OFFLINE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageCacheConfig {
    /// Directory holding encoded images. Falls back to the platform cache
    /// directory when unset.
    pub cache_dir: Option<PathBuf>,
    pub memory_budget: ByteSize,
    pub network: NetworkConfig,
}

impl Default for ImageCacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: None,
            memory_budget: DEFAULT_MEMORY_BUDGET,
            network: NetworkConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NetworkConfig {
    pub enabled: bool,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Headers attached to every image request, e.g. an API key.
    pub headers: BTreeMap<String, String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: BTreeMap::new(),
        }
    }
}

impl NetworkConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ImageCacheConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| {
            MediaError::Config(format!("invalid image cache config: {err}"))
        })
    }

    /// Load defaults, then `path` if given, then environment overrides.
    ///
    /// A path that was asked for but cannot be read is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|err| {
                    MediaError::Config(format!(
                        "failed to read config {}: {err}",
                        path.display()
                    ))
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|v| !v.trim().is_empty())
        {
            self.cache_dir = Some(PathBuf::from(dir));
        }

        if let Some(raw) = lookup(ENV_MEMORY_BUDGET) {
            self.memory_budget = raw.parse().map_err(|err| {
                MediaError::Config(format!("{ENV_MEMORY_BUDGET}: {err}"))
            })?;
        }

        if let Some(raw) = lookup(ENV_OFFLINE) {
            let offline = parse_flag(&raw).ok_or_else(|| {
                MediaError::Config(format!(
                    "{ENV_OFFLINE}: expected a boolean, got {raw:?}"
                ))
            })?;
            self.network.enabled = !offline;
        }

        Ok(())
    }

    /// The configured directory, or `<platform cache>/images`.
    pub fn resolved_cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        default_cache_dir().ok_or_else(|| {
            MediaError::Config(
                "no cache directory configured and no platform cache \
                 directory available"
                    .to_string(),
            )
        })
    }
}

pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
        .map(|dirs| dirs.cache_dir().join(IMAGE_CACHE_DIR_NAME))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn defaults_match_constants() {
        let config = ImageCacheConfig::default();
        assert_eq!(config.memory_budget, ByteSize::from_mib(64));
        assert!(config.network.enabled);
        assert_eq!(config.network.timeout(), Duration::from_secs(30));
        assert!(config.network.headers.is_empty());
    }

    #[test]
    fn toml_overrides_only_what_it_names() {
        let config = ImageCacheConfig::from_toml_str(
            r#"
            cache_dir = "/var/cache/marquee"
            memory_budget = "16MiB"

            [network.headers]
            x-api-key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache_dir, Some(PathBuf::from("/var/cache/marquee")));
        assert_eq!(config.memory_budget, ByteSize::from_mib(16));
        assert!(config.network.enabled);
        assert_eq!(config.network.headers["x-api-key"], "secret");
    }

    #[test]
    fn numeric_budget_is_bytes() {
        let config =
            ImageCacheConfig::from_toml_str("memory_budget = 2048").unwrap();
        assert_eq!(config.memory_budget, ByteSize::from_kib(2));
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = ImageCacheConfig::from_toml_str("memory_budget = \"lots\"")
            .unwrap_err();
        assert!(matches!(err, MediaError::Config(_)));

        let err =
            ImageCacheConfig::from_toml_str("bogus = 1").unwrap_err();
        assert!(matches!(err, MediaError::Config(_)));
    }

    #[test]
    fn env_overrides_win() {
        let mut config = ImageCacheConfig::default();
        config
            .apply_overrides_from(env(&[
                (ENV_CACHE_DIR, "/tmp/posters"),
                (ENV_MEMORY_BUDGET, "512KiB"),
                (ENV_OFFLINE, "true"),
            ]))
            .unwrap();

        assert_eq!(config.resolved_cache_dir().unwrap(), PathBuf::from("/tmp/posters"));
        assert_eq!(config.memory_budget, ByteSize::from_kib(512));
        assert!(!config.network.enabled);
    }

    #[test]
    fn bad_env_values_are_rejected() {
        let mut config = ImageCacheConfig::default();
        assert!(
            config
                .apply_overrides_from(env(&[(ENV_OFFLINE, "maybe")]))
                .is_err()
        );
        assert!(
            config
                .apply_overrides_from(env(&[(ENV_MEMORY_BUDGET, "-1")]))
                .is_err()
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageCacheConfig::load(Some(&dir.path().join("none.toml")))
            .unwrap_err();
        assert!(matches!(err, MediaError::Config(_)));
    }
}
