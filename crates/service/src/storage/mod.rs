//! Blob storage abstractions for the service layer
//!
//! User records live as one JSON object per key. The handlers only ever
//! talk to [`BlobStore`], so the backend can be swapped for an in-memory
//! fake in tests or a directory of files when running locally.

use async_trait::async_trait;
use thiserror::Error;

pub mod fs_blob_store;
pub mod memory;

pub use fs_blob_store::FsBlobStore;
pub use memory::MemoryBlobStore;

/// Suffix appended to a record identifier to form its object key.
pub const OBJECT_SUFFIX: &str = ".json";

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("object not found: {0}")]
    NotFound(String),
    #[error("invalid object key: {0}")]
    InvalidKey(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Key-value object store keyed by string.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Metadata-only existence check; never reads the payload.
    async fn exists(&self, key: &str) -> Result<bool, BlobError>;
    /// Read the full object. Fails with [`BlobError::NotFound`] when absent.
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;
    /// Unconditionally write (create or overwrite) an object.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError>;
}

/// Object key for a record identifier: `<id>.json`.
pub fn object_key(id: &str) -> String { format!("{id}{OBJECT_SUFFIX}") }

/// Inverse of [`object_key`].
pub fn id_from_key(key: &str) -> Option<&str> { key.strip_suffix(OBJECT_SUFFIX) }
