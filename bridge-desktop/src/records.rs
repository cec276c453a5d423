//! Record store over the PostgREST API exposed at `{endpoint}/rest/v1`

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpMethod, HttpRequest},
    records::{RecordFields, RecordFilter, RecordStore},
};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::storage::status_error;

/// `RecordStore` that issues `PATCH /rest/v1/{table}?{column}=eq.{value}`
///
/// The request asks for `return=representation` so the number of updated
/// rows can be read from the returned JSON array.
pub struct PostgrestRecordStore {
    http_client: Arc<dyn HttpClient>,
    endpoint: String,
    service_key: String,
}

impl PostgrestRecordStore {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        endpoint: impl Into<String>,
        service_key: impl Into<String>,
    ) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            endpoint,
            service_key: service_key.into(),
        }
    }

    fn update_url(&self, table: &str, filter: &RecordFilter) -> String {
        format!(
            "{}/rest/v1/{}?{}=eq.{}",
            self.endpoint,
            urlencoding::encode(table),
            urlencoding::encode(&filter.column),
            urlencoding::encode(&filter.value)
        )
    }
}

#[async_trait]
impl RecordStore for PostgrestRecordStore {
    async fn update(
        &self,
        table: &str,
        filter: &RecordFilter,
        fields: &RecordFields,
    ) -> Result<u64> {
        let request = HttpRequest::new(HttpMethod::Patch, self.update_url(table, filter))
            .header("apikey", self.service_key.clone())
            .bearer_token(self.service_key.clone())
            .header("Prefer", "return=representation")
            .json(fields.as_map())?;

        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            return Err(status_error(&response));
        }

        // 204 means the server ignored the representation preference
        if response.body.is_empty() {
            return Ok(0);
        }

        let rows: Value = response.json()?;
        let matched = rows.as_array().map(|rows| rows.len() as u64).ok_or_else(|| {
            BridgeError::OperationFailed(format!(
                "Expected a JSON array from {} update, got {}",
                table, rows
            ))
        })?;

        debug!(table, column = %filter.column, matched, "Records updated");
        Ok(matched)
    }
}
