//! HTTP collaborator contract.
//!
//! The stores never talk to the network directly: they build an [`ApiRequest`]
//! and hand it to an [`HttpTransport`], which resolves to a parsed JSON body or
//! a [`DatahubError`](crate::DatahubError).
//!
//! # Module Structure
//!
//! - `transport`: request descriptor and transport trait
//! - `guard`: transport decorator that invalidates the session on HTTP 401

mod guard;
mod transport;

pub use guard::{UnauthorizedCallback, UnauthorizedGuard};
pub use transport::{ApiRequest, HttpMethod, HttpTransport, RequestAuth};
