//! # Avatar Sync Module
//!
//! Drives creators through acquire → store → record, one at a time.
//!
//! ## Components
//!
//! - **Pipeline** (`pipeline`): Per-creator state machine, pacing, run report
//! - **Statistics** (`stats`): Monotonic run counters and the final summary
//! - **Source** (`source`): Ordered creator usernames from a CSV export

pub mod error;
pub mod pipeline;
pub mod source;
pub mod stats;

pub use error::{Result, SyncError};
pub use pipeline::{CreatorOutcome, SyncPipeline};
pub use source::{CreatorSource, CsvCreatorSource};
pub use stats::{CreatorFailure, FailureStage, RecordWarning, RunStatistics, SyncReport};
