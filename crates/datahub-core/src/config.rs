//! Client configuration model.
//!
//! Loaded from `config.toml` by the infrastructure `ConfigService`; every
//! field has a default so a missing or partial file is valid.

use serde::{Deserialize, Serialize};

/// Root configuration for the DataHub client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Scheme, host and port of the REST API (no trailing slash).
    pub base_url: String,
    /// Per-request timeout.
    pub request_timeout_secs: u64,
    /// Delay between the last search keystroke and the dataset fetch.
    pub search_debounce_ms: u64,
    pub endpoints: Endpoints,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
            search_debounce_ms: 500,
            endpoints: Endpoints::default(),
        }
    }
}

/// REST paths, relative to `base_url`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub datasets: String,
    pub resources: String,
    pub graphql: String,
    pub login: String,
    pub register: String,
    pub refresh: String,
    pub profile: String,
    pub change_password: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            datasets: "/api/datasets/".to_string(),
            resources: "/api/resources/".to_string(),
            graphql: "/api/graphql/".to_string(),
            login: "/auth/login/".to_string(),
            register: "/auth/register/".to_string(),
            refresh: "/auth/refresh/".to_string(),
            profile: "/users/me/".to_string(),
            change_password: "/users/me/change-password/".to_string(),
        }
    }
}

impl Endpoints {
    /// Path of a single dataset, e.g. `/api/datasets/<id>/`.
    pub fn dataset_detail(&self, id: &str) -> String {
        format!("{}/{}/", self.datasets.trim_end_matches('/'), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            base_url = "https://donnees.example.org"

            [endpoints]
            login = "/api/token/"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_url, "https://donnees.example.org");
        assert_eq!(config.search_debounce_ms, 500);
        assert_eq!(config.endpoints.login, "/api/token/");
        assert_eq!(config.endpoints.datasets, "/api/datasets/");
    }

    #[test]
    fn test_dataset_detail_path() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.dataset_detail("abc-123"), "/api/datasets/abc-123/");
    }
}
