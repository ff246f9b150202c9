//! Token repository trait.

use super::model::TokenPair;
use crate::error::Result;

/// Durable storage for the access/refresh token pair.
///
/// This is the single persistence seam for credentials: the session store
/// writes through it, the transport reads the access token from it on every
/// request, and the 401 guard clears it. Operations are synchronous and
/// last-write-wins.
pub trait TokenRepository: Send + Sync {
    /// Reads the persisted pair; absent keys come back as `None`.
    fn load(&self) -> Result<TokenPair>;

    /// Replaces the persisted pair. A `None` refresh token removes that key.
    fn store(&self, tokens: &TokenPair) -> Result<()>;

    /// Removes both tokens. Clearing an empty repository is not an error.
    fn clear(&self) -> Result<()>;

    /// Convenience accessor for the current access token.
    fn access_token(&self) -> Option<String> {
        self.load().ok().and_then(|tokens| tokens.access)
    }
}
