//! # Avatar Acquisition Module
//!
//! Fetches creator avatars from external sources and turns them into the
//! canonical artifact stored for every creator.
//!
//! ## Overview
//!
//! This module handles:
//! - Ordered source fallback with a plausibility threshold ([`AvatarAcquirer`])
//! - Decoding, alpha flattening, square resizing and JPEG encoding ([`ImageNormalizer`])

pub mod acquirer;
pub mod error;
pub mod normalizer;

pub use acquirer::AvatarAcquirer;
pub use error::{MetadataError, Result};
pub use normalizer::ImageNormalizer;
