//! SessionStore - authentication state machine.
//!
//! Owns the token pair and the current user profile. Tokens go through the
//! injected [`TokenRepository`] on every change so a fresh store (or the
//! transport's ambient bearer lookup) sees the same credentials.

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};

use datahub_core::auth::{SessionState, SessionStatus, TokenPair, TokenRepository, UserProfile};
use datahub_core::config::Endpoints;
use datahub_core::error::{DatahubError, Result};
use datahub_core::http::{ApiRequest, HttpTransport};
use datahub_core::messages::{self, failure_message};
use serde::Deserialize;
use serde_json::{Map, Value, json};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

/// Session store.
///
/// Every async operation moves `status` through `loading` to `succeeded` or
/// `failed` (`registered` for a successful registration) and records a
/// user-facing message in `error` on failure. The returned `Result` mirrors
/// the transition that has already been applied.
pub struct SessionStore {
    state: RwLock<SessionState>,
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenRepository>,
    endpoints: Endpoints,
}

impl SessionStore {
    /// Creates the store from whatever tokens were persisted.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: Arc<dyn TokenRepository>,
        endpoints: Endpoints,
    ) -> Self {
        let persisted = tokens.load().unwrap_or_else(|e| {
            tracing::warn!("Failed to read persisted tokens, starting logged out: {}", e);
            TokenPair::default()
        });

        Self {
            state: RwLock::new(SessionState::from_tokens(persisted)),
            transport,
            tokens,
            endpoints,
        }
    }

    // ============================================================================
    // Read model
    // ============================================================================

    pub fn snapshot(&self) -> SessionState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }

    pub fn access_token(&self) -> Option<String> {
        self.snapshot().access_token
    }

    // ============================================================================
    // Async operations
    // ============================================================================

    /// Exchanges credentials for a token pair.
    ///
    /// Empty credentials fail validation without issuing a request.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(self.fail(
                DatahubError::validation(messages::CREDENTIALS_REQUIRED),
                messages::LOGIN_FIELDS,
                messages::LOGIN_FAILED,
            ));
        }

        self.begin();
        let request = ApiRequest::post(&self.endpoints.login)
            .with_body(json!({ "username": username, "password": password }))
            .anonymous();

        let response = self
            .transport
            .send(request)
            .await
            .and_then(decode_tokens)
            .map_err(|e| self.fail(e, messages::LOGIN_FIELDS, messages::LOGIN_FAILED))?;

        self.apply_tokens(response.access, response.refresh);
        self.finish(SessionStatus::Succeeded);
        tracing::info!("Logged in as {}", username);
        Ok(())
    }

    /// Creates an account. Authentication state is left unchanged.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<()> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(self.fail(
                DatahubError::validation(messages::CREDENTIALS_REQUIRED),
                messages::REGISTER_FIELDS,
                messages::REGISTER_FAILED,
            ));
        }

        self.begin();
        let mut body = Map::new();
        body.insert("username".into(), json!(username));
        body.insert("password".into(), json!(password));
        insert_present(&mut body, "email", email);
        insert_present(&mut body, "phone_number", phone_number);

        let request = ApiRequest::post(&self.endpoints.register)
            .with_body(Value::Object(body))
            .anonymous();

        self.transport
            .send(request)
            .await
            .map_err(|e| self.fail(e, messages::REGISTER_FIELDS, messages::REGISTER_FAILED))?;

        self.finish(SessionStatus::Registered);
        tracing::info!("Registered account {}", username);
        Ok(())
    }

    /// Replaces `user` with the server's profile.
    pub async fn fetch_profile(&self) -> Result<UserProfile> {
        let token = self.require_access(messages::PROFILE_FETCH_FAILED)?;

        self.begin();
        let request = ApiRequest::get(&self.endpoints.profile).with_bearer(token);
        let profile = self
            .transport
            .send(request)
            .await
            .and_then(decode_profile)
            .map_err(|e| self.fail_authenticated(e, &[], messages::PROFILE_FETCH_FAILED))?;

        self.set_profile_succeeded(profile.clone());
        Ok(profile)
    }

    /// Sends the changed fields and replaces `user` with what the server
    /// returns.
    pub async fn update_profile(
        &self,
        email: Option<&str>,
        phone_number: Option<&str>,
    ) -> Result<UserProfile> {
        let token = self.require_access(messages::PROFILE_UPDATE_FAILED)?;

        self.begin();
        let mut body = Map::new();
        insert_present(&mut body, "email", email);
        insert_present(&mut body, "phone_number", phone_number);

        let request = ApiRequest::patch(&self.endpoints.profile)
            .with_body(Value::Object(body))
            .with_bearer(token);
        let profile = self
            .transport
            .send(request)
            .await
            .and_then(decode_profile)
            .map_err(|e| {
                self.fail_authenticated(
                    e,
                    messages::PROFILE_UPDATE_FIELDS,
                    messages::PROFILE_UPDATE_FAILED,
                )
            })?;

        self.set_profile_succeeded(profile.clone());
        Ok(profile)
    }

    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        let token = self.require_access(messages::CHANGE_PASSWORD_FAILED)?;

        self.begin();
        let request = ApiRequest::post(&self.endpoints.change_password)
            .with_body(json!({
                "old_password": old_password,
                "new_password": new_password,
            }))
            .with_bearer(token);

        self.transport.send(request).await.map_err(|e| {
            self.fail_authenticated(
                e,
                messages::CHANGE_PASSWORD_FIELDS,
                messages::CHANGE_PASSWORD_FAILED,
            )
        })?;

        self.finish(SessionStatus::Succeeded);
        tracing::info!("Password changed");
        Ok(())
    }

    /// Obtains a new access token with the stored refresh token.
    ///
    /// A rotated refresh token replaces the stored one; otherwise the current
    /// refresh token is kept.
    pub async fn refresh(&self) -> Result<()> {
        let Some(refresh) = self.snapshot().refresh_token else {
            return Err(self.fail(
                DatahubError::Unauthenticated,
                &[],
                messages::REFRESH_FAILED,
            ));
        };

        self.begin();
        let request = ApiRequest::post(&self.endpoints.refresh)
            .with_body(json!({ "refresh": refresh }))
            .anonymous();

        let response = self
            .transport
            .send(request)
            .await
            .and_then(decode_tokens)
            .map_err(|e| self.fail(e, &[], messages::REFRESH_FAILED))?;

        self.apply_tokens(response.access, response.refresh.or(Some(refresh)));
        self.finish(SessionStatus::Succeeded);
        tracing::debug!("Access token refreshed");
        Ok(())
    }

    // ============================================================================
    // Synchronous operations
    // ============================================================================

    /// Drops the whole session and the persisted tokens. Idempotent.
    pub fn logout(&self) {
        *self.write() = SessionState::default();
        if let Err(e) = self.tokens.clear() {
            tracing::warn!("Failed to remove persisted tokens: {}", e);
        }
        tracing::info!("Logged out");
    }

    /// Installs a token pair obtained outside the login flow.
    pub fn set_token_pair(&self, access: impl Into<String>, refresh: impl Into<String>) -> Result<()> {
        let pair = TokenPair::new(access, Some(refresh.into()));
        {
            let mut state = self.write();
            state.access_token = pair.access.clone();
            state.refresh_token = pair.refresh.clone();
        }
        self.tokens.store(&pair)
    }

    /// Installs a new access token, keeping the current refresh token.
    pub fn set_token(&self, access: impl Into<String>) -> Result<()> {
        let pair = {
            let mut state = self.write();
            state.access_token = Some(access.into());
            state.tokens()
        };
        self.tokens.store(&pair)
    }

    pub fn set_user(&self, user: UserProfile) {
        self.write().user = Some(user);
    }

    pub fn clear_error(&self) {
        self.write().error = None;
    }

    /// Returns `status` to idle and clears the error.
    pub fn reset_status(&self) {
        let mut state = self.write();
        state.status = SessionStatus::Idle;
        state.error = None;
    }

    // ============================================================================
    // Reducers
    // ============================================================================

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) {
        let mut state = self.write();
        state.status = SessionStatus::Loading;
        state.error = None;
    }

    fn finish(&self, status: SessionStatus) {
        let mut state = self.write();
        state.status = status;
        state.error = None;
    }

    fn fail(&self, err: DatahubError, fields: &[&str], fallback: &str) -> DatahubError {
        let message = failure_message(&err, fields, fallback);
        tracing::warn!("Session operation failed: {} ({})", message, err);

        let mut state = self.write();
        state.status = SessionStatus::Failed;
        state.error = Some(message);
        err
    }

    /// Like `fail`, but a `401` also drops the session: the held access token
    /// was rejected, so memory and storage both forget it.
    fn fail_authenticated(
        &self,
        err: DatahubError,
        fields: &[&str],
        fallback: &str,
    ) -> DatahubError {
        let err = self.fail(err, fields, fallback);
        if err.is_unauthorized() {
            tracing::warn!("Access token rejected, dropping session");
            {
                let mut state = self.write();
                state.user = None;
                state.access_token = None;
                state.refresh_token = None;
            }
            if let Err(e) = self.tokens.clear() {
                tracing::warn!("Failed to remove persisted tokens: {}", e);
            }
        }
        err
    }

    fn require_access(&self, fallback: &str) -> Result<String> {
        self.access_token()
            .ok_or_else(|| self.fail(DatahubError::Unauthenticated, &[], fallback))
    }

    fn apply_tokens(&self, access: String, refresh: Option<String>) {
        let pair = TokenPair::new(access, refresh);
        {
            let mut state = self.write();
            state.access_token = pair.access.clone();
            state.refresh_token = pair.refresh.clone();
        }
        if let Err(e) = self.tokens.store(&pair) {
            tracing::warn!("Failed to persist tokens: {}", e);
        }
    }

    fn set_profile_succeeded(&self, profile: UserProfile) {
        let mut state = self.write();
        state.user = Some(profile);
        state.status = SessionStatus::Succeeded;
        state.error = None;
    }
}

fn decode_tokens(body: Value) -> Result<TokenResponse> {
    Ok(serde_json::from_value(body)?)
}

fn decode_profile(body: Value) -> Result<UserProfile> {
    Ok(serde_json::from_value(body)?)
}

fn insert_present(body: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        body.insert(key.to_string(), json!(value));
    }
}
