//! Atomic TOML file operations.
//!
//! Writes go through a temp file + fsync + rename under an exclusive fs2 lock,
//! so a crash never leaves a half-written credentials file behind.

use datahub_core::error::{DatahubError, Result};
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

/// A handle to a TOML file with atomic replace semantics.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file. A missing or blank file is `Ok(None)`.
    pub fn load(&self) -> Result<Option<T>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(toml::from_str(&content)?))
    }

    /// Serializes `data` and atomically replaces the file under the lock.
    pub fn save(&self, data: &T) -> Result<()> {
        let serialized = toml::to_string_pretty(data)?;
        let _lock = FileLock::acquire(&self.path)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = create_private(&tmp_path)?;
        tmp_file.write_all(serialized.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Deletes the file. A missing file is not an error.
    pub fn remove(&self) -> Result<()> {
        let _lock = FileLock::acquire(&self.path)?;
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// `.<name>.tmp` next to the target, so the rename stays on one filesystem.
    fn temp_path(&self) -> Result<PathBuf> {
        match (self.path.parent(), self.path.file_name()) {
            (Some(parent), Some(name)) => {
                Ok(parent.join(format!(".{}.tmp", name.to_string_lossy())))
            }
            _ => Err(DatahubError::storage(format!(
                "Not a file path: {}",
                self.path.display()
            ))),
        }
    }
}

/// Creates (truncating) a file readable only by the owner on Unix.
fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    options.open(path)
}

/// Exclusive lock on `<file>.lock`, released and removed on drop.
struct FileLock {
    _file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_path = path.with_extension("lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive().map_err(|e| {
                DatahubError::storage(format!(
                    "Failed to lock {}: {}",
                    lock_path.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            _file: file,
            lock_path,
        })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Credentials {
        access: String,
        refresh: Option<String>,
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Credentials>::new(temp_dir.path().join("tokens.toml"));

        let creds = Credentials {
            access: "a".to_string(),
            refresh: Some("r".to_string()),
        };
        file.save(&creds).unwrap();

        assert_eq!(file.load().unwrap(), Some(creds));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicTomlFile::<Credentials>::new(temp_dir.path().join("missing.toml"));

        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tokens.toml");
        let file = AtomicTomlFile::<Credentials>::new(path.clone());

        file.save(&Credentials {
            access: "a".to_string(),
            refresh: None,
        })
        .unwrap();
        file.remove().unwrap();
        file.remove().unwrap();

        assert!(!path.exists());
    }

    #[test]
    fn test_no_temp_or_lock_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tokens.toml");
        let file = AtomicTomlFile::<Credentials>::new(path.clone());

        file.save(&Credentials {
            access: "a".to_string(),
            refresh: None,
        })
        .unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join(".tokens.toml.tmp").exists());
        assert!(!temp_dir.path().join("tokens.lock").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tokens.toml");
        let file = AtomicTomlFile::<Credentials>::new(path.clone());
        file.save(&Credentials {
            access: "a".to_string(),
            refresh: None,
        })
        .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
