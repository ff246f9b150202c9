//! Infrastructure layer for the DataHub client.
//!
//! Concrete implementations of the core seams: reqwest-backed HTTP transport,
//! file and in-memory token repositories, and the TOML configuration service.

pub mod config_service;
pub mod http;
pub mod paths;
pub mod storage;
pub mod token_repository;

pub use crate::config_service::ConfigService;
pub use crate::http::ReqwestTransport;
pub use crate::paths::DatahubPaths;
pub use crate::token_repository::{FileTokenRepository, InMemoryTokenRepository};
