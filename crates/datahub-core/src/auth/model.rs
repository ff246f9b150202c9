use serde::{Deserialize, Serialize};

/// Access/refresh credentials as persisted and as held in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<String>,
}

impl TokenPair {
    pub fn new(access: impl Into<String>, refresh: Option<String>) -> Self {
        Self {
            access: Some(access.into()),
            refresh,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

/// The authenticated user's profile, replaced wholesale from server responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Outcome of the most recent session operation.
///
/// This tracks operations, not authentication: a failed profile fetch leaves
/// the user logged in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
    /// Reached only from a successful registration.
    Registered,
}

/// Read model of the session store.
///
/// `is_authenticated` is derived from `access_token`; there is no stored flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub user: Option<UserProfile>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub status: SessionStatus,
    pub error: Option<String>,
}

impl SessionState {
    /// Builds the initial state from whatever was persisted.
    pub fn from_tokens(tokens: TokenPair) -> Self {
        Self {
            access_token: tokens.access,
            refresh_token: tokens.refresh,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn is_loading(&self) -> bool {
        self.status == SessionStatus::Loading
    }

    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn tokens(&self) -> TokenPair {
        TokenPair {
            access: self.access_token.clone(),
            refresh: self.refresh_token.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_authentication_is_derived_from_access_token() {
        let state = SessionState::from_tokens(TokenPair::new("abc", None));
        assert!(state.is_authenticated());

        let state = SessionState::from_tokens(TokenPair {
            access: None,
            refresh: Some("r".to_string()),
        });
        assert!(!state.is_authenticated());
    }

    #[test]
    fn test_profile_optional_fields() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": 7,
            "username": "marie",
            "email": "marie@example.org",
            "phone_number": null
        }))
        .unwrap();

        assert_eq!(profile.id, 7);
        assert_eq!(profile.email.as_deref(), Some("marie@example.org"));
        assert!(profile.phone_number.is_none());
        assert!(profile.role.is_none());
    }
}
