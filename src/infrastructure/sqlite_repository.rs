// SQLite repository implementation for weather history
use crate::application::history_repository::HistoryRepository;
use crate::domain::history::{HistoryRecord, NewHistoryRecord};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde_json::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS history (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        city TEXT NOT NULL,
        date_from TEXT,
        date_to TEXT,
        data TEXT
    );
"#;

const DATE_FORMAT: &str = "%Y-%m-%d";

// id, city, date_from, date_to, data
type RawRow = (i64, String, Option<String>, Option<String>, Option<String>);

/// History store on a single SQLite connection.
///
/// Statements run on the blocking pool; the connection is shared behind a
/// std mutex so each call holds it only inside `spawn_blocking`.
pub struct SqliteHistoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteHistoryRepository {
    /// Open (or create) the database file and apply the schema
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open history database {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to create history table")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| anyhow!("History database lock poisoned"))?;
            f(&conn)
        })
        .await
        .context("History database task failed")?
    }

    fn map_row(row: &Row<'_>) -> rusqlite::Result<RawRow> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    }

    fn into_record((id, city, date_from, date_to, data): RawRow) -> Result<HistoryRecord> {
        let parse_date = |raw: Option<String>, column: &str| -> Result<NaiveDate> {
            let raw = raw.with_context(|| format!("Record {} has no {}", id, column))?;
            NaiveDate::parse_from_str(&raw, DATE_FORMAT)
                .with_context(|| format!("Record {} has invalid {} {:?}", id, column, raw))
        };

        // Blobs that are not valid JSON are surfaced as plain strings
        let data = match data {
            Some(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
            None => Value::Null,
        };

        Ok(HistoryRecord {
            id,
            date_from: parse_date(date_from, "date_from")?,
            date_to: parse_date(date_to, "date_to")?,
            city,
            data,
        })
    }

    /// Rows without readable dates are treated as absent, for listing and lookup alike.
    fn decode(row: RawRow) -> Option<HistoryRecord> {
        match Self::into_record(row) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping unreadable history row: {:#}", e);
                None
            }
        }
    }
}

#[async_trait]
impl HistoryRepository for SqliteHistoryRepository {
    async fn create(&self, record: &NewHistoryRecord) -> Result<i64> {
        let data = serde_json::to_string(&record.data)?;
        let city = record.city.clone();
        let date_from = record.date_from.format(DATE_FORMAT).to_string();
        let date_to = record.date_to.format(DATE_FORMAT).to_string();
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO history (city, date_from, date_to, data) VALUES (?1, ?2, ?3, ?4)",
                params![city, date_from, date_to, data],
            )
            .context("Failed to insert history record")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<HistoryRecord>> {
        let rows = self
            .with_conn(|conn| {
                let mut stmt = conn
                    .prepare("SELECT id, city, date_from, date_to, data FROM history ORDER BY id")?;
                let rows = stmt
                    .query_map([], Self::map_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;
        tracing::debug!("Loaded {} history records", rows.len());

        Ok(rows.into_iter().filter_map(Self::decode).collect())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<HistoryRecord>> {
        let row = self
            .with_conn(move |conn| {
                Ok(conn
                    .query_row(
                        "SELECT id, city, date_from, date_to, data FROM history WHERE id = ?1",
                        params![id],
                        Self::map_row,
                    )
                    .optional()?)
            })
            .await?;
        Ok(row.and_then(Self::decode))
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool> {
        self.with_conn(move |conn| {
            let deleted = conn.execute("DELETE FROM history WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn update_to_today(&self, id: i64, date: NaiveDate, data: &Value) -> Result<bool> {
        let data = serde_json::to_string(data)?;
        let date = date.format(DATE_FORMAT).to_string();
        self.with_conn(move |conn| {
            let updated = conn.execute(
                "UPDATE history SET date_from = ?1, date_to = ?1, data = ?2 WHERE id = ?3",
                params![date, data, id],
            )?;
            Ok(updated > 0)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(date: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date, DATE_FORMAT).unwrap()
    }

    fn insert_raw(repo: &SqliteHistoryRepository, sql: &str) {
        repo.conn.lock().unwrap().execute(sql, []).unwrap();
    }

    fn new_record(city: &str, data: Value) -> NewHistoryRecord {
        NewHistoryRecord {
            city: city.to_string(),
            date_from: day("2024-06-01"),
            date_to: day("2024-06-05"),
            data,
        }
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let repo = SqliteHistoryRepository::open_in_memory().unwrap();
        let data = json!({"unit": "metric", "daily_summary": [{"date": "2024-06-01", "avg_temp": 12.5}]});

        let id = repo.create(&new_record("Lisbon", data.clone())).await.unwrap();
        let record = repo.get_by_id(id).await.unwrap().unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.city, "Lisbon");
        assert_eq!(record.date_from, day("2024-06-01"));
        assert_eq!(record.date_to, day("2024-06-05"));
        assert_eq!(record.data, data);
    }

    #[tokio::test]
    async fn test_list_is_ordered_by_id() {
        let repo = SqliteHistoryRepository::open_in_memory().unwrap();
        let first = repo.create(&new_record("A", Value::Null)).await.unwrap();
        let second = repo.create(&new_record("B", json!("text"))).await.unwrap();

        let records = repo.list_all().await.unwrap();

        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![first, second]);
        assert_eq!(records[0].data, Value::Null);
        assert_eq!(records[1].data, json!("text"));
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let repo = SqliteHistoryRepository::open_in_memory().unwrap();

        assert!(repo.get_by_id(42).await.unwrap().is_none());
        assert!(!repo.delete_by_id(42).await.unwrap());
        assert!(!repo.update_to_today(42, day("2024-06-10"), &Value::Null).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = SqliteHistoryRepository::open_in_memory().unwrap();
        let id = repo.create(&new_record("Oslo", Value::Null)).await.unwrap();

        assert!(repo.delete_by_id(id).await.unwrap());
        assert!(repo.get_by_id(id).await.unwrap().is_none());
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_to_today_overwrites_dates_and_data() {
        let repo = SqliteHistoryRepository::open_in_memory().unwrap();
        let id = repo.create(&new_record("Oslo", json!({"temp": 1}))).await.unwrap();

        let updated = repo
            .update_to_today(id, day("2024-06-10"), &json!({"temp": 9}))
            .await
            .unwrap();
        let record = repo.get_by_id(id).await.unwrap().unwrap();

        assert!(updated);
        assert_eq!(record.date_from, day("2024-06-10"));
        assert_eq!(record.date_to, day("2024-06-10"));
        assert_eq!(record.data, json!({"temp": 9}));
        assert_eq!(record.city, "Oslo");
    }

    #[tokio::test]
    async fn test_legacy_non_json_blob_is_returned_as_text() {
        let repo = SqliteHistoryRepository::open_in_memory().unwrap();
        insert_raw(
            &repo,
            "INSERT INTO history (city, date_from, date_to, data) VALUES ('Rome', '2024-06-01', '2024-06-01', '{''temp'': 25}')",
        );

        let records = repo.list_all().await.unwrap();

        assert_eq!(records[0].data, json!("{'temp': 25}"));
    }

    #[tokio::test]
    async fn test_rows_without_dates_are_absent_everywhere() {
        let repo = SqliteHistoryRepository::open_in_memory().unwrap();
        insert_raw(&repo, "INSERT INTO history (city, data) VALUES ('Rome', NULL)");
        let id = repo.create(&new_record("Oslo", Value::Null)).await.unwrap();

        let records = repo.list_all().await.unwrap();

        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![id]);
        assert!(repo.get_by_id(id - 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");

        let id = {
            let repo = SqliteHistoryRepository::open(&path).unwrap();
            repo.create(&new_record("Cairo", Value::Null)).await.unwrap()
        };

        let reopened = SqliteHistoryRepository::open(&path).unwrap();
        assert!(reopened.get_by_id(id).await.unwrap().is_some());
    }
}
