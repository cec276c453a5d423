//! # Sync Pipeline
//!
//! Runs every creator through the same state machine, strictly in input
//! order:
//!
//! ```text
//! START -> blank username ----------------------------> SKIPPED (failed)
//!       -> ACQUIRE -> no plausible source ------------> FAILED  (failed)
//!                  -> ok (downloaded) -> STORE -> err -> FAILED  (failed)
//!                                              -> ok (uploaded) -> RECORD
//! RECORD -> matched (updated) -----------------------> DONE
//!        -> no match / record store error -----------> DONE (warning)
//! ```
//!
//! A creator stops at its first failing stage. Nothing inside a creator's
//! processing aborts the batch.

use crate::error::{Result, SyncError};
use crate::stats::{CreatorFailure, FailureStage, RecordWarning, RunStatistics, SyncReport};
use bridge_traits::http::HttpClient;
use bridge_traits::records::RecordStore;
use bridge_traits::storage::ObjectStorage;
use bridge_traits::time::Clock;
use core_library::{ArtifactStore, CreatorIdentifier, CreatorRecordUpdater, PublicReference};
use core_metadata::AvatarAcquirer;
use core_runtime::config::SyncConfig;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// Result of processing a single creator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatorOutcome {
    /// Blank or missing username; no network traffic
    Skipped,
    /// Every avatar source was rejected
    AcquireFailed { identifier: CreatorIdentifier },
    /// The artifact was produced but the upload failed
    StoreFailed {
        identifier: CreatorIdentifier,
        reason: String,
    },
    /// Stored and recorded
    Updated {
        identifier: CreatorIdentifier,
        url: PublicReference,
    },
    /// Stored, but no record was updated
    RecordUnmatched {
        identifier: CreatorIdentifier,
        url: PublicReference,
        reason: String,
    },
}

impl CreatorOutcome {
    fn touched_network(&self) -> bool {
        !matches!(self, CreatorOutcome::Skipped)
    }
}

pub struct SyncPipeline {
    acquirer: AvatarAcquirer,
    store: ArtifactStore,
    updater: CreatorRecordUpdater,
    pacing_delay: Duration,
}

impl SyncPipeline {
    pub fn new(
        acquirer: AvatarAcquirer,
        store: ArtifactStore,
        updater: CreatorRecordUpdater,
        pacing_delay: Duration,
    ) -> Self {
        Self {
            acquirer,
            store,
            updater,
            pacing_delay,
        }
    }

    /// Wire the pipeline from configuration and bridge implementations
    pub fn from_config(
        config: &SyncConfig,
        http_client: Arc<dyn HttpClient>,
        storage: Arc<dyn ObjectStorage>,
        records: Arc<dyn RecordStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(
            AvatarAcquirer::new(http_client, &config.avatar),
            ArtifactStore::from_config(storage, &config.storage),
            CreatorRecordUpdater::new(records, clock, config.records.clone()),
            config.pacing_delay,
        )
    }

    /// Process every creator in order and report the outcome.
    ///
    /// The bucket is provisioned first; that step never aborts the run.
    #[instrument(skip_all, fields(total = usernames.len()))]
    pub async fn run(&self, usernames: &[Option<String>]) -> SyncReport {
        let started = Instant::now();
        let total = usernames.len();
        let mut report = SyncReport::default();

        self.store.ensure_bucket().await;
        info!(total, "Starting avatar sync");

        for (index, raw) in usernames.iter().enumerate() {
            let position = index + 1;
            info!(
                index = position,
                total,
                username = raw.as_deref().unwrap_or(""),
                "Processing creator"
            );

            let outcome = self.process(raw.as_deref()).await;
            report.statistics.record(&outcome);
            collect(&mut report, position, raw.as_deref(), &outcome);

            if outcome.touched_network() && position < total && !self.pacing_delay.is_zero() {
                sleep(self.pacing_delay).await;
            }
        }

        report.elapsed = started.elapsed();
        log_summary(&report.statistics);
        report
    }

    /// Refresh a single creator on demand.
    ///
    /// # Errors
    ///
    /// `SyncError::Input` when the username is blank.
    pub async fn sync_one(&self, username: &str) -> Result<CreatorOutcome> {
        if CreatorIdentifier::parse(username).is_none() {
            return Err(SyncError::Input(format!(
                "'{}' is not a usable username",
                username
            )));
        }

        self.store.ensure_bucket().await;
        Ok(self.process(Some(username)).await)
    }

    async fn process(&self, raw: Option<&str>) -> CreatorOutcome {
        let Some(identifier) = raw.and_then(CreatorIdentifier::parse) else {
            warn!("Skipping creator without username");
            return CreatorOutcome::Skipped;
        };

        let Some(artifact) = self.acquirer.acquire_for(&identifier).await else {
            return CreatorOutcome::AcquireFailed { identifier };
        };
        info!(username = %identifier, size = artifact.len(), "Avatar downloaded");

        let url = match self.store.upload(&identifier, &artifact).await {
            Ok(url) => url,
            Err(error) => {
                warn!(username = %identifier, %error, "Avatar upload failed");
                return CreatorOutcome::StoreFailed {
                    identifier,
                    reason: error.to_string(),
                };
            }
        };
        info!(username = %identifier, %url, "Avatar uploaded");

        match self.updater.update(&identifier, &url).await {
            Ok(true) => {
                info!(username = %identifier, "Creator record updated");
                CreatorOutcome::Updated { identifier, url }
            }
            Ok(false) => {
                warn!(username = %identifier, "No creator record matched");
                CreatorOutcome::RecordUnmatched {
                    identifier,
                    url,
                    reason: "no record matched the bare or @-prefixed username".to_string(),
                }
            }
            Err(error) => {
                warn!(username = %identifier, %error, "Creator record update failed");
                CreatorOutcome::RecordUnmatched {
                    identifier,
                    url,
                    reason: error.to_string(),
                }
            }
        }
    }
}

fn collect(report: &mut SyncReport, position: usize, raw: Option<&str>, outcome: &CreatorOutcome) {
    match outcome {
        CreatorOutcome::Skipped => report.failures.push(CreatorFailure {
            position,
            username: raw.map(str::to_string),
            stage: FailureStage::MissingUsername,
            reason: "blank username".to_string(),
        }),
        CreatorOutcome::AcquireFailed { identifier } => report.failures.push(CreatorFailure {
            position,
            username: Some(identifier.to_string()),
            stage: FailureStage::Acquire,
            reason: "no avatar source returned a usable image".to_string(),
        }),
        CreatorOutcome::StoreFailed { identifier, reason } => {
            report.failures.push(CreatorFailure {
                position,
                username: Some(identifier.to_string()),
                stage: FailureStage::Store,
                reason: reason.clone(),
            })
        }
        CreatorOutcome::RecordUnmatched {
            identifier,
            url,
            reason,
        } => report.warnings.push(RecordWarning {
            position,
            username: identifier.to_string(),
            url: url.to_string(),
            reason: reason.clone(),
        }),
        CreatorOutcome::Updated { .. } => {}
    }
}

fn log_summary(stats: &RunStatistics) {
    info!(
        total = stats.total(),
        downloaded = stats.downloaded(),
        uploaded = stats.uploaded(),
        updated = stats.updated(),
        failed = stats.failed(),
        "Avatar sync finished"
    );
}
