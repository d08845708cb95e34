// Repository trait for saved weather history
use crate::domain::history::{HistoryRecord, NewHistoryRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

#[async_trait]
pub trait HistoryRepository: Send + Sync {
    /// Persist a record and return its id
    async fn create(&self, record: &NewHistoryRecord) -> anyhow::Result<i64>;

    /// All records, oldest first
    async fn list_all(&self) -> anyhow::Result<Vec<HistoryRecord>>;

    async fn get_by_id(&self, id: i64) -> anyhow::Result<Option<HistoryRecord>>;

    /// Returns false when no record had this id
    async fn delete_by_id(&self, id: i64) -> anyhow::Result<bool>;

    /// Set both dates to `date` and replace the data blob.
    /// Returns false when no record had this id
    async fn update_to_today(&self, id: i64, date: NaiveDate, data: &Value) -> anyhow::Result<bool>;
}
