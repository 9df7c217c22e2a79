//! Durable mirror of the session's `{ user }` field.
//!
//! The session manager writes a [`Snapshot`] after every applied transition
//! and reads it once when it is constructed. Stores are synchronous; writes
//! are small and happen while the session state lock is held so the order
//! on disk matches the order of transitions.

use crate::{errors::AppError, types::Snapshot};
use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::debug;

/// Name of the persisted record.
pub const STORAGE_KEY: &str = "auth-storage";

pub trait SnapshotStore: Send + Sync {
    /// Reads the persisted snapshot, `None` when nothing was saved yet.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the record exists but cannot be read
    /// or decoded.
    fn load(&self) -> Result<Option<Snapshot>, AppError>;

    /// Replaces the persisted snapshot.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the record cannot be written.
    fn save(&self, snapshot: &Snapshot) -> Result<(), AppError>;

    /// Deletes the persisted record.
    ///
    /// # Errors
    /// Returns `AppError::Storage` if the record cannot be removed.
    fn clear(&self) -> Result<(), AppError>;
}

/// Stores the snapshot as `<dir>/auth-storage.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            path: directory.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<Snapshot>, AppError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(AppError::Storage(format!(
                    "Failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };

        serde_json::from_str(&content).map(Some).map_err(|err| {
            AppError::Storage(format!("Failed to decode {}: {err}", self.path.display()))
        })
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(snapshot)
            .map_err(|err| AppError::Serialization(format!("Failed to encode snapshot: {err}")))?;
        write_private(&self.path, &content)?;
        debug!(path = %self.path.display(), "session snapshot saved");
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        remove_if_exists(&self.path)
    }
}

/// In-process store. Also records how many times it was written, which lets
/// callers observe the persistence step.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    snapshot: Option<Snapshot>,
    writes: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                snapshot: Some(snapshot),
                writes: 0,
            }),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.lock().snapshot.clone()
    }

    #[must_use]
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, AppError> {
        Ok(self.lock().snapshot.clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), AppError> {
        let mut inner = self.lock();
        inner.snapshot = Some(snapshot.clone());
        inner.writes += 1;
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        self.lock().snapshot = None;
        Ok(())
    }
}

/// Writes a file readable only by the current user.
pub(crate) fn write_private(path: &Path, content: &str) -> Result<(), AppError> {
    let storage_err =
        |err: std::io::Error| AppError::Storage(format!("Failed to write {}: {err}", path.display()));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(storage_err)?;
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(storage_err)?;
    file.write_all(content.as_bytes()).map_err(storage_err)?;
    file.sync_all().map_err(storage_err)
}

pub(crate) fn remove_if_exists(path: &Path) -> Result<(), AppError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(AppError::Storage(format!(
            "Failed to remove {}: {err}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::User;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("jobboard-store-{}", Uuid::new_v4()))
    }

    fn user() -> User {
        User {
            id: "1".to_string(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            role: "employer".to_string(),
            profile_image: None,
            profile: None,
        }
    }

    #[test]
    fn file_store_missing_record_is_none() {
        let store = FileStore::new(temp_dir());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn file_store_save_then_load() {
        let dir = temp_dir();
        let store = FileStore::new(&dir);
        assert!(store.path().ends_with("auth-storage.json"));

        store.save(&Snapshot::with_user(Some(user()))).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.state.user, Some(user()));

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("isAuthenticated"));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn file_store_corrupt_record_is_an_error() {
        let dir = temp_dir();
        fs::create_dir_all(&dir).unwrap();
        let store = FileStore::new(&dir);
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(AppError::Storage(_))));
        let _ = fs::remove_dir_all(dir);
    }

    #[cfg(unix)]
    #[test]
    fn file_store_record_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = temp_dir();
        let store = FileStore::new(dir.join("nested"));
        store.save(&Snapshot::with_user(Some(user()))).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);

        remove_if_exists(store.path()).unwrap();
        remove_if_exists(store.path()).unwrap();
        assert!(!store.path().exists());
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn memory_store_counts_writes() {
        let store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);

        store.save(&Snapshot::with_user(Some(user()))).unwrap();
        store.save(&Snapshot::with_user(None)).unwrap();

        assert_eq!(store.writes(), 2);
        assert_eq!(store.snapshot(), Some(Snapshot::with_user(None)));
    }
}
