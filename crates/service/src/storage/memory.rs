use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BlobError, BlobStore};

/// In-process blob store. Backs the `memory` storage backend and the tests.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Arc<Self> { Arc::new(Self::default()) }

    pub async fn len(&self) -> usize { self.inner.read().await.len() }

    pub async fn is_empty(&self) -> bool { self.inner.read().await.is_empty() }

    pub async fn contains(&self, key: &str) -> bool { self.inner.read().await.contains_key(key) }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn exists(&self, key: &str) -> Result<bool, BlobError> {
        Ok(self.contains(key).await)
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let map = self.inner.read().await;
        map.get(key).cloned().ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        let mut map = self.inner.write().await;
        map.insert(key.to_string(), bytes);
        Ok(())
    }
}
