//! ReqwestTransport - `HttpTransport` over reqwest.

use async_trait::async_trait;
use datahub_core::auth::TokenRepository;
use datahub_core::config::ClientConfig;
use datahub_core::error::{DatahubError, Result};
use datahub_core::http::{ApiRequest, HttpMethod, HttpTransport, RequestAuth};
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Sends [`ApiRequest`]s to the REST API with reqwest.
///
/// For `RequestAuth::Ambient` requests the access token is read from
/// the token source at send time, so a token stored after construction is
/// picked up by the next request.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    token_source: Option<Arc<dyn TokenRepository>>,
}

impl ReqwestTransport {
    /// Creates a transport with a default reqwest client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_source: None,
        }
    }

    /// Creates a transport honouring the configured base URL and timeout.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| DatahubError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token_source: None,
        })
    }

    /// Sets where the bearer token is looked up for unpinned requests.
    pub fn with_token_source(mut self, tokens: Arc<dyn TokenRepository>) -> Self {
        self.token_source = Some(tokens);
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn bearer_for(&self, request: &ApiRequest) -> Option<String> {
        match &request.auth {
            RequestAuth::Bearer(token) => Some(token.clone()),
            RequestAuth::Anonymous => None,
            RequestAuth::Ambient => self
                .token_source
                .as_ref()
                .and_then(|tokens| tokens.access_token()),
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Patch => self.client.patch(&url),
        };

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.bearer_for(&request) {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!("{} {}", request.method.as_str(), url);

        let response = builder
            .send()
            .await
            .map_err(|e| DatahubError::transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| DatahubError::transport(format!("Failed to read response body: {}", e)))?;

        if status.is_success() {
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(DatahubError::from);
        }

        tracing::debug!("{} {} -> {}", request.method.as_str(), url, status);
        let body = if text.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(&text).unwrap_or(Value::String(text)))
        };
        Err(DatahubError::http(status.as_u16(), body))
    }
}
