//! Configuration service implementation.
//!
//! Loads `ClientConfig` from `config.toml` (~/.config/datahub/config.toml by
//! default) and applies environment overrides.

use crate::paths::DatahubPaths;
use crate::storage::AtomicTomlFile;
use datahub_core::config::ClientConfig;
use datahub_core::error::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "DATAHUB_BASE_URL";

/// Configuration service that loads and caches the client configuration.
///
/// A missing file yields defaults; a malformed file is reported by
/// [`ConfigService::load`] and replaced by defaults in
/// [`ConfigService::get_config`].
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    config: Arc<RwLock<Option<ClientConfig>>>,
}

impl ConfigService {
    /// Creates a service reading `<config_dir>/config.toml`.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let path = DatahubPaths::new(base_path).config_file()?;
        Ok(Self::with_path(path))
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> ClientConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load {:?}, using defaults: {}", self.path, e);
            with_env_overrides(ClientConfig::default())
        });

        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = Some(loaded.clone());

        loaded
    }

    /// Reads the file without touching the cache.
    pub fn load(&self) -> Result<ClientConfig> {
        let file = AtomicTomlFile::<ClientConfig>::new(self.path.clone());
        let config = file.load()?.unwrap_or_default();
        Ok(with_env_overrides(config))
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(PoisonError::into_inner);
        *write_lock = None;
    }
}

fn with_env_overrides(mut config: ClientConfig) -> ClientConfig {
    if let Ok(base_url) = std::env::var(BASE_URL_ENV)
        && !base_url.trim().is_empty()
    {
        config.base_url = base_url.trim().trim_end_matches('/').to_string();
    }
    config
}
