//! Domain layer for the DataHub client.
//!
//! Holds the models shared by the session and catalog stores, the error type,
//! and the two collaborator seams the stores depend on: [`http::HttpTransport`]
//! for the REST API and [`auth::TokenRepository`] for durable credentials.

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod http;
pub mod messages;

// Re-export common error type
pub use error::{DatahubError, Result};
