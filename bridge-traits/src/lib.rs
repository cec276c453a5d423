//! # Host Bridge Traits
//!
//! Capability traits for everything the sync core talks to outside the
//! process.
//!
//! ## Overview
//!
//! This crate defines the contract between the core crates and the concrete
//! backends. Each trait represents one external collaborator; the core never
//! names a vendor SDK directly.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP for avatar sources and REST backends
//! - [`ObjectStorage`](storage::ObjectStorage) - Buckets, overwriting uploads, public URLs
//! - [`RecordStore`](records::RecordStore) - Equality-filtered row updates
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//!
//! ## Implementations
//!
//! | Trait           | Implementation Crate | Type                   |
//! |-----------------|----------------------|------------------------|
//! | `HttpClient`    | `bridge-desktop`     | `ReqwestHttpClient`    |
//! | `ObjectStorage` | `bridge-desktop`     | `SupabaseStorage`      |
//! | `RecordStore`   | `bridge-desktop`     | `PostgrestRecordStore` |
//! | `Clock`         | this crate           | `SystemClock`          |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations should convert backend-specific errors to `BridgeError`
//! and keep the message actionable (status code, endpoint, reason).
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so implementations can be shared
//! behind `Arc<dyn Trait>`.

pub mod error;
pub mod http;
pub mod records;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use records::{RecordFields, RecordFilter, RecordStore};
pub use storage::{BucketOptions, ObjectStorage, UploadOptions};
pub use time::{Clock, LogLevel, SystemClock};
