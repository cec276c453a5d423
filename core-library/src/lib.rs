//! # Creator Library
//!
//! Owns the creator-side domain: identifiers, normalized artifacts, the
//! object store that holds them, and the creator records that point at them.
//!
//! ## Overview
//!
//! This crate manages:
//! - [`CreatorIdentifier`](models::CreatorIdentifier) normalization (bare and `@`-prefixed forms)
//! - [`ArtifactStore`](artifact_store::ArtifactStore): bucket provisioning, overwriting uploads, public URLs
//! - [`CreatorRecordUpdater`](repositories::CreatorRecordUpdater): reference + timestamp updates with the two-form fallback

pub mod artifact_store;
pub mod error;
pub mod models;
pub mod repositories;

pub use artifact_store::{ArtifactStore, BucketStatus};
pub use error::{LibraryError, Result};
pub use models::{CreatorIdentifier, NormalizedArtifact, PublicReference, StoredObjectKey};
pub use repositories::CreatorRecordUpdater;
