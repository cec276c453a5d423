//! Domain models for creator avatars
//!
//! Identifiers are normalized once on construction; artifacts can never be
//! empty. Everything downstream relies on those two guarantees.

use crate::error::{LibraryError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Content type of every canonical artifact
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Extension appended to the bare username to form an object key
const OBJECT_KEY_EXTENSION: &str = ".jpg";

// =============================================================================
// CreatorIdentifier
// =============================================================================

/// Normalized creator username.
///
/// Surrounding whitespace and leading `@` characters are stripped on
/// construction. Both the bare (`alice`) and prefixed (`@alice`) forms are
/// available because stored records use either convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CreatorIdentifier(String);

impl CreatorIdentifier {
    /// Normalize a raw input cell. Returns `None` for blank values.
    pub fn parse(raw: &str) -> Option<Self> {
        let bare = raw.trim().trim_start_matches('@').trim();
        if bare.is_empty() {
            None
        } else {
            Some(Self(bare.to_string()))
        }
    }

    /// Username without the `@` prefix
    pub fn bare(&self) -> &str {
        &self.0
    }

    /// Username with a single leading `@`
    pub fn prefixed(&self) -> String {
        format!("@{}", self.0)
    }

    /// Deterministic storage key for this creator's avatar
    pub fn object_key(&self) -> StoredObjectKey {
        StoredObjectKey(format!("{}{}", self.0, OBJECT_KEY_EXTENSION))
    }
}

impl TryFrom<String> for CreatorIdentifier {
    type Error = LibraryError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw).ok_or_else(|| LibraryError::InvalidInput {
            field: "username".to_string(),
            message: "username is blank".to_string(),
        })
    }
}

impl From<CreatorIdentifier> for String {
    fn from(id: CreatorIdentifier) -> Self {
        id.0
    }
}

impl fmt::Display for CreatorIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// NormalizedArtifact
// =============================================================================

/// Canonical avatar bytes plus their content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedArtifact {
    bytes: Bytes,
    content_type: String,
}

impl NormalizedArtifact {
    /// Wrap encoded bytes.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when `bytes` is empty.
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(LibraryError::InvalidInput {
                field: "artifact".to_string(),
                message: "normalized artifact cannot be empty".to_string(),
            });
        }

        Ok(Self {
            bytes,
            content_type: content_type.into(),
        })
    }

    pub fn jpeg(bytes: impl Into<Bytes>) -> Result<Self> {
        Self::new(bytes, JPEG_CONTENT_TYPE)
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

// =============================================================================
// Keys and references
// =============================================================================

/// Object key inside the avatar bucket, `<bare-username>.jpg`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredObjectKey(String);

impl StoredObjectKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoredObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unsigned public URL of a stored avatar
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicReference(String);

impl PublicReference {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PublicReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
