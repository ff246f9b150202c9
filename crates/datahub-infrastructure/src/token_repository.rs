//! Token repository implementations.
//!
//! `FileTokenRepository` persists the token pair to `tokens.toml`;
//! `InMemoryTokenRepository` keeps it for the lifetime of the process.

use crate::paths::DatahubPaths;
use crate::storage::AtomicTomlFile;
use datahub_core::auth::{TokenPair, TokenRepository};
use datahub_core::error::{DatahubError, Result};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// File-backed token storage.
///
/// Every `load` reads the file, so a token written by another process (or by
/// the 401 guard) is seen on the next request.
///
/// # Example
///
/// ```ignore
/// use datahub_infrastructure::FileTokenRepository;
/// use datahub_core::auth::{TokenPair, TokenRepository};
///
/// let repo = FileTokenRepository::new(None)?;
/// repo.store(&TokenPair::new("access", Some("refresh".into())))?;
/// ```
pub struct FileTokenRepository {
    file: AtomicTomlFile<TokenPair>,
}

impl FileTokenRepository {
    /// Creates a repository at `<config_dir>/datahub/tokens.toml`, or under
    /// `base_path` when given.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let path = DatahubPaths::new(base_path).token_file()?;
        Ok(Self::with_path(path))
    }

    /// Creates a repository backed by an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

impl TokenRepository for FileTokenRepository {
    fn load(&self) -> Result<TokenPair> {
        Ok(self.file.load()?.unwrap_or_default())
    }

    fn store(&self, tokens: &TokenPair) -> Result<()> {
        if tokens.is_empty() {
            return self.clear();
        }
        self.file.save(tokens)?;
        tracing::debug!("Persisted token pair to {:?}", self.file.path());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.file.remove()?;
        tracing::debug!("Removed persisted tokens at {:?}", self.file.path());
        Ok(())
    }
}

/// Process-local token storage.
#[derive(Debug, Default)]
pub struct InMemoryTokenRepository {
    tokens: Mutex<TokenPair>,
}

impl InMemoryTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with an already-persisted pair.
    pub fn with_tokens(tokens: TokenPair) -> Self {
        Self {
            tokens: Mutex::new(tokens),
        }
    }
}

impl TokenRepository for InMemoryTokenRepository {
    fn load(&self) -> Result<TokenPair> {
        self.tokens
            .lock()
            .map(|tokens| tokens.clone())
            .map_err(|e| DatahubError::storage(format!("Token lock poisoned: {}", e)))
    }

    fn store(&self, tokens: &TokenPair) -> Result<()> {
        let mut guard = self
            .tokens
            .lock()
            .map_err(|e| DatahubError::storage(format!("Token lock poisoned: {}", e)))?;
        *guard = tokens.clone();
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.store(&TokenPair::default())
    }
}
