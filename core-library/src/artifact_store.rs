//! Avatar artifact storage
//!
//! Wraps an [`ObjectStorage`] collaborator with the bucket and options of
//! one run. Uploads always overwrite, so re-running a creator replaces the
//! previous object and the public URL stays the same.

use crate::error::{LibraryError, Result};
use crate::models::{CreatorIdentifier, NormalizedArtifact, PublicReference, StoredObjectKey};
use bridge_traits::storage::{BucketOptions, ObjectStorage, UploadOptions};
use core_runtime::config::StorageConfig;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Outcome of [`ArtifactStore::ensure_bucket`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketStatus {
    /// The bucket was already there
    Existing,
    /// The bucket was created by this call
    Created,
    /// Existence could not be confirmed; uploads proceed anyway
    Unverified,
}

pub struct ArtifactStore {
    storage: Arc<dyn ObjectStorage>,
    bucket: String,
    options: BucketOptions,
}

impl ArtifactStore {
    pub fn new(storage: Arc<dyn ObjectStorage>, bucket: impl Into<String>, options: BucketOptions) -> Self {
        Self {
            storage,
            bucket: bucket.into(),
            options,
        }
    }

    /// Build a store from the storage section of the run configuration
    pub fn from_config(storage: Arc<dyn ObjectStorage>, config: &StorageConfig) -> Self {
        let options = BucketOptions {
            public: config.public,
            file_size_limit: Some(config.file_size_limit),
            allowed_mime_types: config.allowed_mime_types.clone(),
        };
        Self::new(storage, config.bucket.clone(), options)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Make sure the bucket exists, creating it when absent.
    ///
    /// Never fails: the credential may be allowed to upload without being
    /// allowed to list or create buckets.
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn ensure_bucket(&self) -> BucketStatus {
        match self.storage.bucket_exists(&self.bucket).await {
            Ok(true) => {
                debug!("Bucket already exists");
                return BucketStatus::Existing;
            }
            Ok(false) => {}
            Err(error) => {
                // Fall through and try to create it
                warn!(%error, "Could not check bucket existence");
            }
        }

        match self.storage.create_bucket(&self.bucket, &self.options).await {
            Ok(()) => {
                info!(
                    public = self.options.public,
                    file_size_limit = ?self.options.file_size_limit,
                    "Bucket created"
                );
                BucketStatus::Created
            }
            Err(error) => {
                warn!(%error, "Could not create bucket, continuing with uploads");
                BucketStatus::Unverified
            }
        }
    }

    /// Upload (overwrite) the creator's artifact and return its public URL.
    ///
    /// # Errors
    ///
    /// `LibraryError::Storage` when the backend rejects the upload.
    pub async fn upload(
        &self,
        identifier: &CreatorIdentifier,
        artifact: &NormalizedArtifact,
    ) -> Result<PublicReference> {
        let key = identifier.object_key();
        let options = UploadOptions::new(artifact.content_type()).with_upsert(true);

        self.storage
            .upload(&self.bucket, key.as_str(), artifact.bytes().clone(), &options)
            .await
            .map_err(|source| LibraryError::Storage {
                key: key.to_string(),
                source,
            })?;

        debug!(bucket = %self.bucket, key = %key, size = artifact.len(), "Artifact uploaded");
        Ok(self.public_url(&key))
    }

    /// Public URL for a key; pure, no network
    pub fn public_url(&self, key: &StoredObjectKey) -> PublicReference {
        PublicReference::new(self.storage.public_url(&self.bucket, key.as_str()))
    }
}
