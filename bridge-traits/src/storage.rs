//! Object Storage Abstraction
//!
//! Provides a platform-agnostic trait for bucket-based object storage. The
//! core only needs four capabilities: existence check, bucket creation,
//! overwriting upload, and public URL resolution.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::error::Result;

/// Options applied when a bucket is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketOptions {
    /// Whether objects can be read without credentials
    pub public: bool,
    /// Maximum object size in bytes (`None` means backend default)
    pub file_size_limit: Option<u64>,
    /// MIME types accepted by the bucket (empty means any)
    pub allowed_mime_types: Vec<String>,
}

impl Default for BucketOptions {
    fn default() -> Self {
        Self {
            public: true,
            file_size_limit: None,
            allowed_mime_types: Vec::new(),
        }
    }
}

/// Options applied to a single upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Content type stored with the object
    pub content_type: String,
    /// Replace an existing object at the same key instead of failing
    pub upsert: bool,
}

impl UploadOptions {
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            upsert: false,
        }
    }

    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }
}

/// Bucket-based object storage trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::{ObjectStorage, UploadOptions};
///
/// async fn publish(storage: &dyn ObjectStorage, data: Bytes) -> Result<String> {
///     let options = UploadOptions::new("image/jpeg").with_upsert(true);
///     storage.upload("creator-avatars", "alice.jpg", data, &options).await?;
///     Ok(storage.public_url("creator-avatars", "alice.jpg"))
/// }
/// ```
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Check whether a bucket exists
    ///
    /// Backends that deny listing may return an error even when the bucket
    /// is present; callers decide how fatal that is.
    async fn bucket_exists(&self, bucket: &str) -> Result<bool>;

    /// Create a bucket with the given options
    async fn create_bucket(&self, bucket: &str, options: &BucketOptions) -> Result<()>;

    /// Upload an object
    ///
    /// With `upsert` set, an existing object at `key` is replaced.
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        options: &UploadOptions,
    ) -> Result<()>;

    /// Resolve the public, unsigned URL for an object
    ///
    /// This is a pure derivation from bucket and key; it performs no I/O and
    /// does not check that the object exists.
    fn public_url(&self, bucket: &str, key: &str) -> String;
}
