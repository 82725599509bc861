//! Local filesystem storage backend.
//!
//! Files live under a root directory and are accessed through `tokio::fs`.
//! The catalog documents directory is opened with
//! [`LocalBackend::existing`] (a missing data directory is a configuration
//! mistake), while the lending state directory is opened with
//! [`LocalBackend::new`], which creates it on first use.

use crate::error::ErrorKind;
use crate::{StorageBackend, error::Result, path::validate as validate_path};
use async_trait::async_trait;
use std::fs::create_dir_all as sync_create_dir;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem storage backend.
///
/// # Examples
///
/// ```no_run
/// use shelfmark_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let documents = LocalBackend::existing("documents", "/srv/library/data")?;
/// let state = LocalBackend::new("state", "/home/me/.local/share/shelfmark")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Create a backend rooted at `root`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPath`](ErrorKind::InvalidPath) if the path is not
    /// absolute or exists but is not a directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = Self::checked_root(root)?;
        if !root.exists() {
            // Non-async: happens once per invocation and keeps the
            // constructor synchronous.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
            tracing::debug!(root = %root.display(), "Created storage root directory");
        }
        Ok(Self { name: name.into(), root })
    }

    /// Create a backend over a directory that must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound`](ErrorKind::NotFound) if the directory is missing,
    /// and [`InvalidPath`](ErrorKind::InvalidPath) for the same reasons as
    /// [`LocalBackend::new`].
    pub fn existing(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = Self::checked_root(root)?;
        if !root.exists() {
            exn::bail!(ErrorKind::NotFound(root));
        }
        Ok(Self { name: name.into(), root })
    }

    /// The root directory every relative path is joined onto.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn checked_root(root: impl AsRef<Path>) -> Result<PathBuf> {
        let root = root.as_ref().to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() && !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(root)
    }

    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self, path: &Path) -> Result<bool> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::try_exists(&abs_path).await.map_err(ErrorKind::Io)?)
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        // Write beside the target then rename over it, so a crash mid-write
        // never leaves half a JSON object behind.
        let mut staging = abs_path.clone().into_os_string();
        staging.push(".partial");
        let staging = PathBuf::from(staging);
        fs::write(&staging, data).await.map_err(|e| Self::map_io_error(e, path))?;
        Ok(fs::rename(&staging, &abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::remove_file(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_absolute_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(LocalBackend::new("state", temp_dir.path()).is_ok());
        assert!(LocalBackend::new("state", "relative/path").is_err());
        assert!(LocalBackend::new("state", "./relative").is_err());
    }

    #[test]
    fn test_new_creates_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("nested/state");
        let backend = LocalBackend::new("state", &root).unwrap();
        assert!(root.is_dir());
        assert_eq!(backend.root(), root);
    }

    #[test]
    fn test_existing_rejects_missing_root() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = LocalBackend::existing("documents", temp_dir.path().join("missing")).err().unwrap();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
        assert!(!temp_dir.path().join("missing").exists());
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let file = temp_dir.path().join("books.xml");
        std::fs::write(&file, b"<Books/>").unwrap();
        assert!(LocalBackend::new("documents", &file).is_err());
        assert!(LocalBackend::existing("documents", &file).is_err());
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("state", temp_dir.path()).unwrap();
        backend.write(Path::new("borrowingData.json"), b"{}").await.unwrap();
        assert_eq!(backend.read(Path::new("borrowingData.json")).await.unwrap(), b"{}");
        assert!(!temp_dir.path().join("borrowingData.json.partial").exists());
    }

    #[tokio::test]
    async fn test_write_replaces_contents() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("state", temp_dir.path()).unwrap();
        backend.write(Path::new("state.json"), b"{\"a\":1}").await.unwrap();
        backend.write(Path::new("state.json"), b"{}").await.unwrap();
        assert_eq!(backend.read(Path::new("state.json")).await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_write_creates_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("state", temp_dir.path()).unwrap();
        backend.write(Path::new("a/b/state.json"), b"{}").await.unwrap();
        assert!(backend.exists(Path::new("a/b/state.json")).await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::existing("documents", temp_dir.path()).unwrap();
        let err = backend.read(Path::new("genres.xml")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("state", temp_dir.path()).unwrap();
        backend.write(Path::new("state.json"), b"{}").await.unwrap();
        backend.delete(Path::new("state.json")).await.unwrap();
        assert!(!backend.exists(Path::new("state.json")).await.unwrap());
        let err = backend.delete(Path::new("state.json")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_path_security() {
        let temp_dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new("state", temp_dir.path()).unwrap();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.write(Path::new("../escape.json"), b"{}").await.is_err());
        assert!(backend.delete(Path::new("a/../../file")).await.is_err());
    }
}
