//! Creator record updates

use crate::error::{LibraryError, Result};
use crate::models::{CreatorIdentifier, PublicReference};
use bridge_traits::records::{RecordFields, RecordFilter, RecordStore};
use bridge_traits::time::Clock;
use core_runtime::config::RecordConfig;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Writes the avatar reference and refresh timestamp onto creator rows.
///
/// Stored usernames are inconsistent: some rows keep the bare name, others
/// the `@`-prefixed one. The bare form is tried first and the prefixed form
/// only when nothing matched.
pub struct CreatorRecordUpdater {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
    layout: RecordConfig,
}

impl CreatorRecordUpdater {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>, layout: RecordConfig) -> Self {
        Self {
            store,
            clock,
            layout,
        }
    }

    /// Set the reference on the creator's record.
    ///
    /// # Returns
    /// - `Ok(true)` if a row matched under either username form
    /// - `Ok(false)` if neither form matched
    ///
    /// # Errors
    /// `LibraryError::Record` when the record store itself fails.
    #[instrument(skip_all, fields(username = %identifier))]
    pub async fn update(&self, identifier: &CreatorIdentifier, url: &PublicReference) -> Result<bool> {
        for form in [identifier.bare().to_string(), identifier.prefixed()] {
            let filter = RecordFilter::eq(self.layout.username_column.as_str(), form);
            let fields = RecordFields::new()
                .set(self.layout.reference_column.as_str(), url.as_str())
                .set(self.layout.refreshed_at_column.as_str(), self.clock.now_rfc3339());

            let matched = self
                .store
                .update(&self.layout.table, &filter, &fields)
                .await
                .map_err(|source| LibraryError::Record {
                    table: self.layout.table.clone(),
                    source,
                })?;

            if matched > 0 {
                debug!(form = %filter.value, matched, "Creator record updated");
                return Ok(true);
            }
        }

        debug!("No creator record matched either username form");
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use chrono::{DateTime, TimeZone, Utc};
    use mockall::mock;
    use mockall::Sequence;

    mock! {
        Records {}

        #[async_trait]
        impl RecordStore for Records {
            async fn update(
                &self,
                table: &str,
                filter: &RecordFilter,
                fields: &RecordFields,
            ) -> BridgeResult<u64>;
        }
    }

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn updater(mock: MockRecords) -> CreatorRecordUpdater {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        CreatorRecordUpdater::new(Arc::new(mock), Arc::new(clock), RecordConfig::default())
    }

    fn url() -> PublicReference {
        PublicReference::new("https://cdn.test/creator-avatars/alice.jpg")
    }

    #[tokio::test]
    async fn test_bare_match_stops_after_first_attempt() {
        let mut mock = MockRecords::new();
        mock.expect_update()
            .withf(|table, filter, fields| {
                table == "creators"
                    && filter.column == "tiktok_username"
                    && filter.value == "alice"
                    && fields.get("profile_image_url").and_then(|v| v.as_str())
                        == Some("https://cdn.test/creator-avatars/alice.jpg")
                    && fields.get("profile_image_last_refreshed").and_then(|v| v.as_str())
                        == Some("2024-05-01T12:00:00.000000Z")
            })
            .times(1)
            .returning(|_, _, _| Ok(1));

        let id = CreatorIdentifier::parse("alice").unwrap();
        assert!(updater(mock).update(&id, &url()).await.unwrap());
    }

    #[tokio::test]
    async fn test_falls_back_to_prefixed_form() {
        let mut mock = MockRecords::new();
        let mut seq = Sequence::new();
        mock.expect_update()
            .withf(|_, filter, _| filter.value == "alice")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(0));
        mock.expect_update()
            .withf(|_, filter, _| filter.value == "@alice")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok(1));

        let id = CreatorIdentifier::parse("alice").unwrap();
        assert!(updater(mock).update(&id, &url()).await.unwrap());
    }

    #[tokio::test]
    async fn test_no_match_under_either_form() {
        let mut mock = MockRecords::new();
        mock.expect_update().times(2).returning(|_, _, _| Ok(0));

        let id = CreatorIdentifier::parse("@ghost").unwrap();
        assert!(!updater(mock).update(&id, &url()).await.unwrap());
    }

    #[tokio::test]
    async fn test_store_failure_is_record_error() {
        let mut mock = MockRecords::new();
        mock.expect_update()
            .times(1)
            .returning(|_, _, _| Err(BridgeError::Timeout("rest/v1/creators".into())));

        let id = CreatorIdentifier::parse("alice").unwrap();
        let result = updater(mock).update(&id, &url()).await;
        assert!(matches!(result, Err(LibraryError::Record { ref table, .. }) if table == "creators"));
    }
}
