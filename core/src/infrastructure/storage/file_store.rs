use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;
use tracing::{debug, error};

use crate::domain::{common::entities::app_errors::CoreError, storage::ports::KeyValueStore};

/// One file per key under `root`. Writes go to a sibling temp file that is
/// then renamed over the target, so a crash never leaves a torn value.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    root: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, CoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(CoreError::Storage(format!("invalid storage key: {key:?}")));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                error!("Failed to read {}: {}", path.display(), e);
                Err(CoreError::Storage(e.to_string()))
            }
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        fs::create_dir_all(&self.root).await.map_err(|e| {
            error!("Failed to create {}: {}", self.root.display(), e);
            CoreError::Storage(e.to_string())
        })?;
        fs::write(&tmp, value.as_bytes()).await.map_err(|e| {
            error!("Failed to write {}: {}", tmp.display(), e);
            CoreError::Storage(e.to_string())
        })?;
        fs::rename(&tmp, &path).await.map_err(|e| {
            error!("Failed to replace {}: {}", path.display(), e);
            CoreError::Storage(e.to_string())
        })?;

        debug!(key, bytes = value.len(), "stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                error!("Failed to remove {}: {}", path.display(), e);
                Err(CoreError::Storage(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path().join("data"));

        assert_eq!(store.get("saved_recipes").await.unwrap(), None);

        store.set("saved_recipes", "[1]".to_string()).await.unwrap();
        store.set("saved_recipes", "[2]".to_string()).await.unwrap();
        assert_eq!(
            store.get("saved_recipes").await.unwrap(),
            Some("[2]".to_string())
        );
        assert!(!dir.path().join("data/saved_recipes.json.tmp").exists());

        store.remove("saved_recipes").await.unwrap();
        store.remove("saved_recipes").await.unwrap();
        assert_eq!(store.get("saved_recipes").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        FileKeyValueStore::new(dir.path())
            .set("analytics_session_v1", "abc".to_string())
            .await
            .unwrap();

        let reopened = FileKeyValueStore::new(dir.path());
        assert_eq!(
            reopened.get("analytics_session_v1").await.unwrap(),
            Some("abc".to_string())
        );
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(dir.path());

        assert!(matches!(
            store.set("../escape", "x".to_string()).await,
            Err(CoreError::Storage(_))
        ));
        assert!(store.get("").await.is_err());
    }
}
