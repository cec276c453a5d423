//! # Creator Avatar Sync
//!
//! Workspace facade. Re-exports the pieces needed to wire a sync run:
//! configuration and logging from `core-runtime`, the desktop bridge
//! implementations, and the pipeline itself.
//!
//! ```ignore
//! use creator_avatar_sync::{build_pipeline, SyncConfig};
//!
//! let config = SyncConfig::builder()
//!     .apply_env(|key| std::env::var(key).ok())
//!     .build()?;
//! let pipeline = build_pipeline(&config)?;
//! let report = pipeline.run(&[Some("alice".into())]).await;
//! println!("{}", report);
//! ```

use std::sync::Arc;
use std::time::Duration;

pub use bridge_desktop::{PostgrestRecordStore, ReqwestHttpClient, SupabaseStorage};
pub use bridge_traits::{BridgeError, HttpClient, LogLevel, SystemClock};
pub use core_runtime::config::{SettingsFile, SyncConfig, SyncConfigBuilder};
pub use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
pub use core_sync::{
    CreatorOutcome, CreatorSource, CsvCreatorSource, SyncError, SyncPipeline, SyncReport,
};

/// Client-wide timeout for storage and record calls; avatar fetches carry
/// their own shorter per-request timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Wire a pipeline against the Supabase storage and PostgREST backends
pub fn build_pipeline(config: &SyncConfig) -> Result<SyncPipeline, BridgeError> {
    let http_client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_timeout(CLIENT_TIMEOUT)?);
    let storage = SupabaseStorage::new(
        Arc::clone(&http_client),
        config.storage.endpoint.clone(),
        config.storage.service_key.clone(),
    );
    let records = PostgrestRecordStore::new(
        Arc::clone(&http_client),
        config.storage.endpoint.clone(),
        config.storage.service_key.clone(),
    );

    Ok(SyncPipeline::from_config(
        config,
        http_client,
        Arc::new(storage),
        Arc::new(records),
        Arc::new(SystemClock),
    ))
}
