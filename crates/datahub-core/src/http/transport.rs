use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// How a request is authorized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestAuth {
    /// The transport resolves the current access token itself at send time.
    #[default]
    Ambient,
    /// This exact token is sent.
    Bearer(String),
    /// No `Authorization` header, even if a token is stored.
    Anonymous,
}

/// A transport-agnostic request descriptor.
///
/// `query` is an ordered list so multi-valued parameters (`tags=a&tags=b`)
/// survive.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub auth: RequestAuth,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            auth: RequestAuth::Ambient,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// Appends a query parameter; repeated keys are kept in order.
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Pins the bearer token instead of letting the transport look it up.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.auth = RequestAuth::Bearer(token.into());
        self
    }

    /// Sends the request without credentials (login, registration).
    pub fn anonymous(mut self) -> Self {
        self.auth = RequestAuth::Anonymous;
        self
    }

    /// All values recorded for `key`, in insertion order.
    pub fn query_values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

/// The shared HTTP collaborator.
///
/// Implementations return the decoded JSON body on success (or `Value::Null`
/// for an empty body) and `DatahubError::Http { status, body }` for any
/// non-success status. Connection-level failures map to
/// `DatahubError::Transport`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<Value>;
}
