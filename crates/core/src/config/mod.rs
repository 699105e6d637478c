//! Configuration loading.
//!
//! The main config and every per-plugin `DefaultConfig` are JSON files
//! resolved through the ordered candidate-path search in [`loader`].
//! Both use the same trait-based load/save/reload shape, parsed with
//! `serde_json` rather than TOML.
//!
//! # Example
//!
//! ```ignore
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! pub struct KickVoteConfig {
//!     pub votes_required: u32,
//! }
//!
//! impl gostrike_core::config::PluginConfig for KickVoteConfig {
//!     const SLUG: &'static str = "kickvote";
//! }
//! ```

mod loader;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub use loader::{
    base_dir, configs_dir, core_config_path, data_dir, plugin_config_path, plugin_db_path,
    permissions_db_path,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Per-plugin default configuration, loaded from
/// `configs/plugins/<SLUG>.json`, namespaced by the plugin's slug.
pub trait PluginConfig: Default + Serialize + DeserializeOwned + Send + Sync {
    /// Must match the owning plugin's `Plugin::slug()`.
    const SLUG: &'static str;

    fn load() -> ConfigResult<Self> {
        let path = plugin_config_path(Self::SLUG)?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Self = serde_json::from_str(&content)?;
            tracing::debug!(slug = Self::SLUG, ?path, "loaded plugin config");
            Ok(config)
        } else {
            let default = Self::default();
            default.save()?;
            tracing::info!(slug = Self::SLUG, ?path, "created default plugin config");
            Ok(default)
        }
    }

    fn save(&self) -> ConfigResult<()> {
        let path = plugin_config_path(Self::SLUG)?;
        loader::ensure_parent_dir(&path)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        tracing::debug!(slug = Self::SLUG, ?path, "saved plugin config");
        Ok(())
    }

    fn reload(&mut self) -> ConfigResult<()> {
        let path = plugin_config_path(Self::SLUG)?;
        let content = std::fs::read_to_string(&path)?;
        *self = serde_json::from_str(&content)?;
        tracing::debug!(slug = Self::SLUG, ?path, "reloaded plugin config");
        Ok(())
    }
}

/// Main config: `{"version": string, "log_level": string, "http_bind":
/// string}`. `http_bind` is the ambient addition for the HTTP control
/// plane's listen address.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub version: String,
    pub log_level: String,
    pub http_bind: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            log_level: "info".to_string(),
            http_bind: "127.0.0.1:9400".to_string(),
        }
    }
}

impl CoreConfig {
    pub fn load() -> ConfigResult<Self> {
        let path = core_config_path()?;

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Self = serde_json::from_str(&content)?;
            tracing::debug!(?path, "loaded core config");
            Ok(config)
        } else {
            let default = Self::default();
            default.save()?;
            tracing::info!(?path, "created default core config");
            Ok(default)
        }
    }

    pub fn save(&self) -> ConfigResult<()> {
        let path = core_config_path()?;
        loader::ensure_parent_dir(&path)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        tracing::debug!(?path, "saved core config");
        Ok(())
    }

    pub fn reload(&mut self) -> ConfigResult<()> {
        let path = core_config_path()?;
        let content = std::fs::read_to_string(&path)?;
        *self = serde_json::from_str(&content)?;
        tracing::debug!(?path, "reloaded core config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, PartialEq, Serialize, Deserialize)]
    struct TestConfig {
        pub value: i32,
        pub name: String,
    }

    #[test]
    fn json_round_trip() {
        let config = TestConfig {
            value: 42,
            name: "test".to_string(),
        };
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: TestConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn core_config_default_matches_spec_shape() {
        let config = CoreConfig::default();
        assert_eq!(config.version, "1");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn core_config_round_trips_through_json() {
        let config = CoreConfig {
            version: "2".to_string(),
            log_level: "debug".to_string(),
            http_bind: "127.0.0.1:9400".to_string(),
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: CoreConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.version, "2");
        assert_eq!(parsed.log_level, "debug");
    }
}
