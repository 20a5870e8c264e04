//! JSON-file-backed policy store.

use super::entries::{PolicyEntries, PolicyValue};
use super::error::{StoreError, StoreResult};
use super::{PolicyStore, RouteMap};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// [`PolicyStore`] persisted as a single JSON document.
///
/// Every operation goes back to the file, so a read sees the latest write
/// committed by any handle or process. Access is serialized through an
/// advisory lock on a sibling `.lock` file: shared for reads, exclusive for
/// the read-merge-write of a single key. Writes go to a sibling `.tmp` file
/// that is renamed over the original, so a crash never leaves a truncated
/// policy behind.
#[derive(Debug)]
pub struct FilePolicyStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl FilePolicyStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let store = Self {
            lock_path: sibling(&path, ".lock"),
            path,
        };

        store.with_shared(|_| Ok(()))?;
        info!(path = %store.path.display(), "Opened policy store");
        Ok(store)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn lock_file(&self) -> StoreResult<File> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| self.io_err(e))
    }

    fn load(&self) -> StoreResult<PolicyEntries> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Policy file absent, starting empty");
                return Ok(PolicyEntries::default());
            },
            Err(e) => return Err(self.io_err(e)),
        };
        if content.trim().is_empty() {
            return Ok(PolicyEntries::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&self, entries: &PolicyEntries) -> StoreResult<()> {
        let tmp = sibling(&self.path, ".tmp");
        let content = serde_json::to_string_pretty(entries)?;
        std::fs::write(&tmp, content).map_err(|e| self.io_err(e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))?;
        Ok(())
    }

    fn with_shared<T>(
        &self,
        operation: impl FnOnce(&PolicyEntries) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let lock = self.lock_file()?;
        FileExt::lock_shared(&lock).map_err(|e| self.io_err(e))?;
        let result = self.load().and_then(|entries| operation(&entries));
        drop(lock);
        result
    }

    fn write(&self, key: &str, value: PolicyValue) -> StoreResult<bool> {
        let lock = self.lock_file()?;
        FileExt::lock_exclusive(&lock).map_err(|e| self.io_err(e))?;

        let mut entries = self.load()?;
        if !entries.put(key, value) {
            return Ok(false);
        }
        self.persist(&entries)?;
        drop(lock);

        debug!(key, "Policy setting written");
        Ok(true)
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

impl PolicyStore for FilePolicyStore {
    fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        self.with_shared(|entries| entries.get_string(key))
    }

    fn set_string(
        &self,
        key: &str,
        value: &str,
        sanitizer: &dyn Fn(&str) -> String,
    ) -> StoreResult<bool> {
        self.write(key, PolicyValue::Text(sanitizer(value)))
    }

    fn get_map(&self, key: &str, default: &RouteMap) -> StoreResult<RouteMap> {
        self.with_shared(|entries| Ok(entries.get_map(key)?.unwrap_or_else(|| default.clone())))
    }

    fn set_map(&self, key: &str, value: &RouteMap) -> StoreResult<bool> {
        self.write(key, PolicyValue::Routes(value.clone()))
    }

    fn contains(&self, key: &str) -> StoreResult<bool> {
        self.with_shared(|entries| Ok(entries.contains(key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn verbatim(value: &str) -> String {
        value.to_string()
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FilePolicyStore::open(dir.path().join("policy.json")).unwrap();
        assert!(store.get_string("login_page_url").unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_writes_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("policy.json");

        {
            let store = FilePolicyStore::open(&path).unwrap();
            store
                .set_string("login_page_url", "secure-entry", &verbatim)
                .unwrap();
            let mut routes = RouteMap::new();
            routes.insert("/wp/v2/users".to_string(), true);
            store.set_map("hidden_endpoints", &routes).unwrap();
        }

        let store = FilePolicyStore::open(&path).unwrap();
        assert_eq!(
            store.get_string("login_page_url").unwrap(),
            Some("secure-entry".to_string())
        );
        let routes = store.get_map("hidden_endpoints", &RouteMap::new()).unwrap();
        assert_eq!(routes.get("/wp/v2/users"), Some(&true));
    }

    #[test]
    fn test_two_handles_share_committed_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policy.json");
        let a = FilePolicyStore::open(&path).unwrap();
        let b = FilePolicyStore::open(&path).unwrap();

        a.set_string("login_page_url", "secure-entry", &verbatim)
            .unwrap();
        assert_eq!(
            b.get_string("login_page_url").unwrap(),
            Some("secure-entry".to_string())
        );

        let mut routes = RouteMap::new();
        routes.insert("/wp/v2/users".to_string(), true);
        assert!(b.set_map("hidden_endpoints", &routes).unwrap());
        assert!(a.contains("hidden_endpoints").unwrap());

        let reopened = FilePolicyStore::open(&path).unwrap();
        assert_eq!(
            reopened.get_string("login_page_url").unwrap(),
            Some("secure-entry".to_string())
        );
        assert_eq!(
            reopened
                .get_map("hidden_endpoints", &RouteMap::new())
                .unwrap()
                .get("/wp/v2/users"),
            Some(&true)
        );
    }

    #[test]
    fn test_concurrent_writers_keep_every_key() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policy.json");

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let path = path.clone();
                std::thread::spawn(move || {
                    let store = FilePolicyStore::open(&path).unwrap();
                    store
                        .set_string(&format!("key{i}"), &format!("value{i}"), &verbatim)
                        .unwrap();
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let store = FilePolicyStore::open(&path).unwrap();
        for i in 0..8 {
            assert_eq!(
                store.get_string(&format!("key{i}")).unwrap(),
                Some(format!("value{i}"))
            );
        }
    }

    #[test]
    fn test_malformed_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = FilePolicyStore::open(&path).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policy.json");
        let store = FilePolicyStore::open(&path).unwrap();
        store.set_string("redirect_url", "404", &verbatim).unwrap();

        let mut names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, vec!["policy.json", "policy.json.lock"]);
    }
}
