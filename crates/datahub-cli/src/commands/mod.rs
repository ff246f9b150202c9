pub mod auth;
pub mod catalog;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use datahub_application::{CatalogStore, SessionStore};
use datahub_core::auth::TokenRepository;
use datahub_core::config::ClientConfig;
use datahub_core::http::{HttpTransport, UnauthorizedGuard};
use datahub_infrastructure::{ConfigService, FileTokenRepository, ReqwestTransport};

/// Everything a command needs, wired once per invocation.
pub struct AppContext {
    pub config: ClientConfig,
    pub session: SessionStore,
    pub catalog: Arc<CatalogStore>,
}

impl AppContext {
    pub fn build(config_dir: Option<&Path>) -> Result<Self> {
        let config = ConfigService::new(config_dir)
            .context("Failed to locate configuration directory")?
            .get_config();
        let tokens: Arc<dyn TokenRepository> = Arc::new(
            FileTokenRepository::new(config_dir).context("Failed to locate token storage")?,
        );

        let transport = ReqwestTransport::from_config(&config)
            .context("Failed to create HTTP client")?
            .with_token_source(tokens.clone());

        let transport: Arc<dyn HttpTransport> = Arc::new(
            UnauthorizedGuard::new(transport, tokens.clone()).with_callback(Arc::new(|| {
                tracing::warn!("Session expired, run `datahub login` again");
            })),
        );

        tracing::debug!("Using API at {}", config.base_url);

        Ok(Self {
            session: SessionStore::new(transport.clone(), tokens, config.endpoints.clone()),
            catalog: Arc::new(CatalogStore::new(transport, config.endpoints.clone())),
            config,
        })
    }
}
