//! Authentication domain module.
//!
//! # Module Structure
//!
//! - `model`: token pair, user profile and the session read model
//! - `repository`: durable token storage trait

mod model;
mod repository;

pub use model::{SessionState, SessionStatus, TokenPair, UserProfile};
pub use repository::TokenRepository;
