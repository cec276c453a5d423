//! Record Store Abstraction
//!
//! A minimal table-update capability: set fields on every row whose column
//! equals a value, and report how many rows matched.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;

/// Equality filter on a single column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFilter {
    pub column: String,
    pub value: String,
}

impl RecordFilter {
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Field assignments applied by an update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFields(Map<String, Value>);

impl RecordFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Record store trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::records::{RecordFields, RecordFilter, RecordStore};
///
/// let fields = RecordFields::new().set("profile_image_url", url);
/// let matched = store
///     .update("creators", &RecordFilter::eq("tiktok_username", "alice"), &fields)
///     .await?;
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Apply `fields` to all rows of `table` matching `filter`
    ///
    /// # Returns
    ///
    /// Number of rows that matched and were updated (0 is not an error)
    async fn update(
        &self,
        table: &str,
        filter: &RecordFilter,
        fields: &RecordFields,
    ) -> Result<u64>;
}
