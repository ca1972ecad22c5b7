use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;

/// Storage key for the serialized token string.
pub const TOKEN_KEY: &str = "authToken";
/// Storage key for the serialized user snapshot JSON.
pub const USER_KEY: &str = "currentUser";

/// Keyed string storage backing the client session, the stand-in for browser
/// local storage. Implementations must be infallible from the caller's point
/// of view: failures are logged, never propagated.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory storage, used in tests and by embedders that do not want
/// persistence across restarts.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }
}

/// JSON-file-backed storage persisting the session across process restarts.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStorage {
    /// Opens the backing file, starting empty when it is missing or does not
    /// parse. A corrupted file must never prevent the client from starting.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "corrupted session file; starting empty");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        };

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        match serde_json::to_string_pretty(entries) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to persist session");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize session entries"),
        }
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock();
        entries.remove(key);
        self.persist(&entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_storage_round_trip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get(TOKEN_KEY), None);

        storage.set(TOKEN_KEY, "abc");
        assert_eq!(storage.get(TOKEN_KEY), Some("abc".to_string()));

        storage.remove(TOKEN_KEY);
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[test]
    fn file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let storage = FileStorage::open(&path);
        storage.set(TOKEN_KEY, "tok");
        storage.set(USER_KEY, "{}");
        drop(storage);

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get(TOKEN_KEY), Some("tok".to_string()));
        assert_eq!(reopened.get(USER_KEY), Some("{}".to_string()));
    }

    #[test]
    fn file_storage_survives_corrupted_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json at all").unwrap();

        let storage = FileStorage::open(&path);
        assert_eq!(storage.get(TOKEN_KEY), None);

        // Still writable afterwards.
        storage.set(TOKEN_KEY, "tok");
        assert_eq!(storage.get(TOKEN_KEY), Some("tok".to_string()));
    }
}
