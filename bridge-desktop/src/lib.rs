//! # Desktop Bridge Implementations
//!
//! Default implementations of the bridge traits for a command-line host.
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `ObjectStorage` using the Supabase Storage REST API
//! - `RecordStore` using the PostgREST API
//!
//! Both REST adapters sit on top of any `HttpClient`, so they can be driven
//! by a mock in tests.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{PostgrestRecordStore, ReqwestHttpClient, SupabaseStorage};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let http = Arc::new(ReqwestHttpClient::with_timeout(Duration::from_secs(60))?);
//! let storage = SupabaseStorage::new(http.clone(), endpoint, service_key);
//! let records = PostgrestRecordStore::new(http, endpoint, service_key);
//! ```

mod http;
mod records;
mod storage;

pub use http::ReqwestHttpClient;
pub use records::PostgrestRecordStore;
pub use storage::SupabaseStorage;
