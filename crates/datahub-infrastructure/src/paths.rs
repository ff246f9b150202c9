//! Path management for datahub configuration and credentials.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/datahub/           # Config directory (platform config dir)
//! ├── config.toml              # Client configuration
//! └── tokens.toml              # Persisted access/refresh tokens
//! ```

use std::path::{Path, PathBuf};

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for datahub_core::DatahubError {
    fn from(err: PathError) -> Self {
        datahub_core::DatahubError::config(err.to_string())
    }
}

/// Resolves datahub file locations, optionally under a custom base directory.
#[derive(Debug, Clone)]
pub struct DatahubPaths {
    base: Option<PathBuf>,
}

impl DatahubPaths {
    const APP_DIR: &'static str = "datahub";

    /// Creates a resolver. `None` uses the platform config directory
    /// (e.g. `~/.config/datahub/`); `Some(dir)` is used as-is (tests).
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(Self::APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// # Security Note
    ///
    /// Tokens are stored in plaintext; the file is created with mode 600 on Unix.
    pub fn token_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("tokens.toml"))
    }
}

impl Default for DatahubPaths {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_base() {
        let paths = DatahubPaths::new(Some(Path::new("/tmp/dh")));
        assert_eq!(paths.config_file().unwrap(), PathBuf::from("/tmp/dh/config.toml"));
        assert_eq!(paths.token_file().unwrap(), PathBuf::from("/tmp/dh/tokens.toml"));
    }
}
