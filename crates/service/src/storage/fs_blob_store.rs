use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::{BlobError, BlobStore};

/// Directory-backed blob store: one file per object key.
///
/// Writes land in a temporary sibling file first and are renamed into place,
/// so a concurrent reader sees either the old or the new object, never a
/// partially written one.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open a store rooted at `root`, creating the directory if missing.
    pub async fn new<P: Into<PathBuf>>(root: P) -> Result<Arc<Self>, BlobError> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| BlobError::Io(e.to_string()))?;
        Ok(Arc::new(Self { root }))
    }

    pub fn root(&self) -> &Path { &self.root }

    /// Resolve a key to a file path inside the root. Keys are single path
    /// components; anything that could escape the root is rejected.
    fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
        let invalid = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\', '\0'])
            || key.starts_with(".tmp-");
        if invalid {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn exists(&self, key: &str) -> Result<bool, BlobError> {
        // nothing can ever be stored under an invalid key
        let Ok(path) = self.path_for(key) else { return Ok(false) };
        match fs::metadata(&path).await {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(BlobError::Io(e.to_string())),
        }
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.path_for(key)?;
        fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => BlobError::NotFound(key.to_string()),
            _ => BlobError::Io(e.to_string()),
        })
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        let path = self.path_for(key)?;
        let tmp = self.root.join(format!(".tmp-{}", Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, &bytes).await {
            return Err(BlobError::Io(e.to_string()));
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(BlobError::Io(e.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!("fs_blob_store_{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn fs_store_crud_persists() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let store = FsBlobStore::new(&root).await?;

        assert!(!store.exists("u1.json").await?);
        store.put("u1.json", br#"{"id":"u1"}"#.to_vec()).await?;
        assert!(store.exists("u1.json").await?);
        assert_eq!(store.get("u1.json").await?, br#"{"id":"u1"}"#);

        // overwrite, then reopen to make sure it hit the disk
        store.put("u1.json", br#"{"id":"u1","n":2}"#.to_vec()).await?;
        let reopened = FsBlobStore::new(&root).await?;
        assert_eq!(reopened.get("u1.json").await?, br#"{"id":"u1","n":2}"#);

        // no temp files left behind
        let mut entries = fs::read_dir(&root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["u1.json".to_string()]);

        let _ = fs::remove_dir_all(&root).await;
        Ok(())
    }

    #[tokio::test]
    async fn fs_store_missing_and_invalid_keys() -> Result<(), anyhow::Error> {
        let root = temp_root();
        let store = FsBlobStore::new(&root).await?;

        assert!(matches!(store.get("nope.json").await, Err(BlobError::NotFound(_))));

        for key in ["", "..", "../escape.json", "a/b.json", ".tmp-x"] {
            assert!(!store.exists(key).await?, "exists({key:?})");
            assert!(matches!(store.get(key).await, Err(BlobError::InvalidKey(_))));
            assert!(matches!(store.put(key, b"{}".to_vec()).await, Err(BlobError::InvalidKey(_))));
        }

        let _ = fs::remove_dir_all(&root).await;
        Ok(())
    }
}
