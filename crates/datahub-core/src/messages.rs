//! User-facing failure messages.
//!
//! Failure text shown to the user is picked in a fixed order: a field-level
//! validation error, then the body's `detail`, then its `message`, then a
//! fixed localized fallback. The order is part of the UI contract.

use serde_json::Value;

use crate::error::DatahubError;

pub const LOGIN_FAILED: &str = "Erreur de connexion. Vérifiez vos identifiants.";
pub const REGISTER_FAILED: &str = "Erreur lors de l'inscription";
pub const REFRESH_FAILED: &str = "Impossible de rafraîchir la session";
pub const PROFILE_FETCH_FAILED: &str = "Impossible de charger le profil";
pub const PROFILE_UPDATE_FAILED: &str = "Impossible de mettre à jour le profil";
pub const CHANGE_PASSWORD_FAILED: &str = "Impossible de changer le mot de passe";
pub const DATASET_DETAIL_FAILED: &str = "Erreur lors du chargement du dataset";
pub const RESOURCES_FAILED: &str = "Erreur lors du chargement des ressources";
pub const CREDENTIALS_REQUIRED: &str = "Nom d'utilisateur et mot de passe requis";
pub const AUTHENTICATION_REQUIRED: &str = "Authentification requise";

pub const LOGIN_FIELDS: &[&str] = &["username", "password", "non_field_errors"];
pub const REGISTER_FIELDS: &[&str] = &["username", "email", "password"];
pub const PROFILE_UPDATE_FIELDS: &[&str] = &["email", "phone_number"];
pub const CHANGE_PASSWORD_FIELDS: &[&str] = &["old_password", "new_password"];

/// Picks the message to show for a failed session operation.
///
/// Validation and missing-credential errors carry their own text; server
/// rejections go through the field > detail > message > fallback order;
/// anything else (transport, storage) gets the fallback.
pub fn failure_message(err: &DatahubError, fields: &[&str], fallback: &str) -> String {
    match err {
        DatahubError::Validation(message) => message.clone(),
        DatahubError::Unauthenticated => AUTHENTICATION_REQUIRED.to_string(),
        DatahubError::Http {
            body: Some(body), ..
        } => body_message(body, fields).unwrap_or_else(|| fallback.to_string()),
        _ => fallback.to_string(),
    }
}

/// Message for a failed catalog fetch: the server's error body as-is, or the
/// transport error text.
///
/// A bare string body is used verbatim, a JSON body prefers `detail`/`message`
/// and otherwise is rendered compactly.
pub fn server_error_text(err: &DatahubError) -> String {
    match err {
        DatahubError::Http {
            body: Some(Value::String(text)),
            ..
        } if !text.is_empty() => text.clone(),
        DatahubError::Http {
            body: Some(body @ Value::Object(_)),
            ..
        } => body_message(body, &[]).unwrap_or_else(|| body.to_string()),
        other => other.to_string(),
    }
}

/// Server-provided message for a catalog failure, when the body has one.
pub fn server_message(err: &DatahubError) -> Option<String> {
    match err {
        DatahubError::Http {
            body: Some(Value::String(text)),
            ..
        } if !text.is_empty() => Some(text.clone()),
        DatahubError::Http {
            body: Some(body), ..
        } => body_message(body, &[]),
        _ => None,
    }
}

fn body_message(body: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .find_map(|field| field_error(body, field))
        .or_else(|| non_empty_str(body.get("detail")))
        .or_else(|| non_empty_str(body.get("message")))
}

/// A field error is either `"text"` or `["text", ...]`.
fn field_error(body: &Value, field: &str) -> Option<String> {
    match body.get(field)? {
        Value::Array(items) => items.iter().find_map(|item| non_empty_str(Some(item))),
        other => non_empty_str(Some(other)),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rejected(body: Value) -> DatahubError {
        DatahubError::http(400, Some(body))
    }

    #[test]
    fn test_field_error_wins_over_detail() {
        let err = rejected(json!({
            "detail": "Invalid request",
            "username": ["A user with that username already exists."]
        }));

        assert_eq!(
            failure_message(&err, REGISTER_FIELDS, REGISTER_FAILED),
            "A user with that username already exists."
        );
    }

    #[test]
    fn test_field_order_is_respected() {
        let err = rejected(json!({
            "password": ["This password is too short."],
            "email": ["Enter a valid email address."]
        }));

        assert_eq!(
            failure_message(&err, REGISTER_FIELDS, REGISTER_FAILED),
            "Enter a valid email address."
        );
    }

    #[test]
    fn test_detail_then_message_then_fallback() {
        let err = DatahubError::http(
            401,
            Some(json!({"detail": "No active account found", "message": "ignored"})),
        );
        assert_eq!(
            failure_message(&err, LOGIN_FIELDS, LOGIN_FAILED),
            "No active account found"
        );

        let err = rejected(json!({"message": "Service unavailable"}));
        assert_eq!(
            failure_message(&err, LOGIN_FIELDS, LOGIN_FAILED),
            "Service unavailable"
        );

        let err = rejected(json!({"unrelated": true}));
        assert_eq!(failure_message(&err, LOGIN_FIELDS, LOGIN_FAILED), LOGIN_FAILED);
    }

    #[test]
    fn test_transport_failure_uses_fallback() {
        let err = DatahubError::transport("connection refused");
        assert_eq!(failure_message(&err, LOGIN_FIELDS, LOGIN_FAILED), LOGIN_FAILED);
    }

    #[test]
    fn test_unauthenticated_and_validation_keep_their_text() {
        assert_eq!(
            failure_message(&DatahubError::Unauthenticated, &[], PROFILE_UPDATE_FAILED),
            AUTHENTICATION_REQUIRED
        );
        assert_eq!(
            failure_message(
                &DatahubError::validation(CREDENTIALS_REQUIRED),
                LOGIN_FIELDS,
                LOGIN_FAILED
            ),
            CREDENTIALS_REQUIRED
        );
    }

    #[test]
    fn test_server_error_text() {
        assert_eq!(
            server_error_text(&rejected(json!({"detail": "Page invalide."}))),
            "Page invalide."
        );
        assert_eq!(
            server_error_text(&rejected(json!({"page": ["bad"]}))),
            r#"{"page":["bad"]}"#
        );
        assert_eq!(
            server_error_text(&DatahubError::http(502, Some(json!("Bad Gateway")))),
            "Bad Gateway"
        );
        assert_eq!(
            server_error_text(&DatahubError::transport("timed out")),
            "Transport error: timed out"
        );
    }
}
