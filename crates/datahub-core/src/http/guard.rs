use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::transport::{ApiRequest, HttpTransport, RequestAuth};
use crate::auth::TokenRepository;
use crate::error::Result;

/// Callback fired after a 401 has invalidated the persisted session.
pub type UnauthorizedCallback = Arc<dyn Fn() + Send + Sync>;

/// Transport decorator that centralizes the HTTP 401 side effect.
///
/// A `401` on a credentialed request clears the persisted token pair and fires
/// the registered callback (the composing application wires it to navigation
/// or a user notice). `SessionStore` drops its in-memory tokens on its own when
/// one of its authenticated requests is rejected.
///
/// Anonymous requests (login, registration, refresh) are passed through: a
/// `401` there means bad credentials, not an expired session. The failure is
/// always returned unchanged so the calling store still records it.
pub struct UnauthorizedGuard<T: HttpTransport> {
    inner: T,
    tokens: Arc<dyn TokenRepository>,
    on_unauthorized: Option<UnauthorizedCallback>,
}

impl<T: HttpTransport> UnauthorizedGuard<T> {
    pub fn new(inner: T, tokens: Arc<dyn TokenRepository>) -> Self {
        Self {
            inner,
            tokens,
            on_unauthorized: None,
        }
    }

    pub fn with_callback(mut self, callback: UnauthorizedCallback) -> Self {
        self.on_unauthorized = Some(callback);
        self
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for UnauthorizedGuard<T> {
    async fn send(&self, request: ApiRequest) -> Result<Value> {
        let path = request.path.clone();
        let credentialed = request.auth != RequestAuth::Anonymous;
        let result = self.inner.send(request).await;

        if credentialed
            && let Err(err) = &result
            && err.is_unauthorized()
        {
            tracing::warn!("Received 401 from {}, clearing persisted session", path);
            if let Err(e) = self.tokens.clear() {
                tracing::warn!("Failed to clear persisted tokens: {}", e);
            }
            if let Some(callback) = &self.on_unauthorized {
                callback();
            }
        }

        result
    }
}
