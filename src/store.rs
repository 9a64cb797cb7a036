//! Append-only SQLite log of observations.
//!
//! A single connection sits behind one async mutex, so at most one task
//! touches the database at a time and reads never see a half-written row.
//! The table layout matches the `logs` table of existing `radio_logs.db`
//! files.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{ConnectOptions, Connection, Row};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::data::{Observation, TIMESTAMP_FORMAT};
use crate::error::StoreError;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        radio TEXT,
        listeners INTEGER,
        status INTEGER,
        timestamp TEXT
    )
"#;

/// Durable store of [`Observation`]s.
///
/// Shared between tasks as `Arc<ObservationLog>`.
#[derive(Debug)]
pub struct ObservationLog {
    conn: Mutex<SqliteConnection>,
}

impl ObservationLog {
    /// Open the log at `path`, creating the file and table if absent.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::new().filename(path).create_if_missing(true);
        let log = Self::connect(options).await?;
        info!("Observation log opened at {}", path.display());
        Ok(log)
    }

    /// A private in-memory log with the same schema.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(options).await
    }

    async fn connect(options: SqliteConnectOptions) -> Result<Self, StoreError> {
        let mut conn = options.connect().await?;
        sqlx::query(CREATE_TABLE).execute(&mut conn).await?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Persist one observation and return its row id.
    pub async fn append(&self, observation: &Observation) -> Result<i64, StoreError> {
        let mut conn = self.conn.lock().await;
        let result = sqlx::query(
            "INSERT INTO logs (radio, listeners, status, timestamp) VALUES (?, ?, ?, ?)",
        )
        .bind(&observation.source)
        .bind(i64::from(observation.listeners))
        .bind(i64::from(observation.online))
        .bind(observation.timestamp_text())
        .execute(&mut *conn)
        .await?;

        let id = result.last_insert_rowid();
        debug!(
            id,
            source = %observation.source,
            online = observation.online,
            listeners = observation.listeners,
            "observation appended"
        );
        Ok(id)
    }

    /// Up to `limit` most recent observations of `source`, oldest first.
    pub async fn recent(&self, source: &str, limit: usize) -> Result<Vec<Observation>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = {
            let mut conn = self.conn.lock().await;
            sqlx::query(
                "SELECT id, radio, listeners, status, timestamp FROM logs \
                 WHERE radio = ? ORDER BY timestamp DESC, id DESC LIMIT ?",
            )
            .bind(source)
            .bind(limit)
            .fetch_all(&mut *conn)
            .await?
        };

        let mut observations = rows.iter().map(decode_row).collect::<Result<Vec<_>, _>>()?;
        observations.reverse();
        Ok(observations)
    }

    /// Number of rows stored for `source`.
    pub async fn count(&self, source: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.lock().await;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM logs WHERE radio = ?")
            .bind(source)
            .fetch_one(&mut *conn)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Close the underlying connection.
    pub async fn close(self) -> Result<(), StoreError> {
        self.conn.into_inner().close().await?;
        Ok(())
    }
}

fn decode_row(row: &SqliteRow) -> Result<Observation, StoreError> {
    let id: i64 = row.try_get("id")?;
    let corrupt = |reason: String| StoreError::CorruptRow { id, reason };

    let source: Option<String> = row.try_get("radio")?;
    let listeners: Option<i64> = row.try_get("listeners")?;
    let status: Option<i64> = row.try_get("status")?;
    let timestamp: Option<String> = row.try_get("timestamp")?;

    let source = source.ok_or_else(|| corrupt("missing source".into()))?;
    let listeners = u32::try_from(listeners.unwrap_or(0))
        .map_err(|_| corrupt("listener count out of range".into()))?;
    let timestamp = timestamp.ok_or_else(|| corrupt("missing timestamp".into()))?;
    let timestamp = NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT)
        .map_err(|e| corrupt(format!("bad timestamp '{}': {}", timestamp, e)))?;

    Ok(Observation {
        source,
        listeners,
        online: status.unwrap_or(0) != 0,
        timestamp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StreamStatus;
    use chrono::{Duration as ChronoDuration, NaiveDate};
    use std::sync::Arc;

    fn base_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn obs(source: &str, listeners: u32, offset_secs: i64) -> Observation {
        Observation::at(
            source,
            StreamStatus::online(listeners),
            base_time() + ChronoDuration::seconds(offset_secs),
        )
    }

    #[tokio::test]
    async fn test_recent_empty() {
        let log = ObservationLog::in_memory().await.unwrap();
        assert!(log.recent("tabajara", 10).await.unwrap().is_empty());
        assert_eq!(log.count("tabajara").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_recent_returns_all_when_fewer_than_limit() {
        let log = ObservationLog::in_memory().await.unwrap();
        for i in 0..3 {
            log.append(&obs("tabajara", i as u32, i)).await.unwrap();
        }

        let recent = log.recent("tabajara", 10).await.unwrap();
        let listeners: Vec<u32> = recent.iter().map(|o| o.listeners).collect();
        assert_eq!(listeners, vec![0, 1, 2]);
        assert!(recent.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_recent_returns_last_n_ascending() {
        let log = ObservationLog::in_memory().await.unwrap();
        for i in 0..25 {
            log.append(&obs("parahyba", i as u32, i)).await.unwrap();
        }

        let recent = log.recent("parahyba", 10).await.unwrap();
        let listeners: Vec<u32> = recent.iter().map(|o| o.listeners).collect();
        assert_eq!(listeners, (15..25).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_same_second_rows_keep_insertion_order() {
        let log = ObservationLog::in_memory().await.unwrap();
        for listeners in [4, 5, 6] {
            log.append(&obs("tabajara", listeners, 0)).await.unwrap();
        }

        let recent = log.recent("tabajara", 2).await.unwrap();
        let listeners: Vec<u32> = recent.iter().map(|o| o.listeners).collect();
        assert_eq!(listeners, vec![5, 6]);
    }

    #[tokio::test]
    async fn test_sources_are_isolated() {
        let log = ObservationLog::in_memory().await.unwrap();
        log.append(&obs("tabajara", 1, 0)).await.unwrap();
        log.append(&obs("parahyba", 2, 1)).await.unwrap();
        log.append(&obs("tabajara", 3, 2)).await.unwrap();

        let recent = log.recent("tabajara", 10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent.iter().all(|o| o.source == "tabajara"));
        assert_eq!(log.count("parahyba").await.unwrap(), 1);
        assert!(log.recent("tabajara", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_trips_offline_rows() {
        let log = ObservationLog::in_memory().await.unwrap();
        let down = Observation::at("parahyba", StreamStatus::offline(), base_time());
        log.append(&down).await.unwrap();

        let recent = log.recent("parahyba", 1).await.unwrap();
        assert_eq!(recent, vec![down]);
    }

    #[tokio::test]
    async fn test_open_creates_file_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("radio_logs.db");
        assert!(!path.exists());

        let log = ObservationLog::open(&path).await.unwrap();
        log.append(&obs("tabajara", 9, 0)).await.unwrap();
        log.close().await.unwrap();
        assert!(path.exists());

        let reopened = ObservationLog::open(&path).await.unwrap();
        let recent = reopened.recent("tabajara", 5).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].listeners, 9);
    }

    #[tokio::test]
    async fn test_concurrent_append_and_read() {
        let log = Arc::new(ObservationLog::in_memory().await.unwrap());

        let writer = {
            let log = log.clone();
            tokio::spawn(async move {
                for i in 0..200 {
                    log.append(&obs("tabajara", i as u32, i)).await.unwrap();
                    tokio::task::yield_now().await;
                }
            })
        };

        let reader = {
            let log = log.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let recent = log.recent("tabajara", 15).await.unwrap();
                    assert!(recent.len() <= 15);
                    assert!(recent.iter().all(|o| o.source == "tabajara" && o.online));
                    assert!(recent.windows(2).all(|w| w[0].listeners + 1 == w[1].listeners));
                    tokio::task::yield_now().await;
                }
            })
        };

        writer.await.unwrap();
        reader.await.unwrap();

        let recent = log.recent("tabajara", 15).await.unwrap();
        assert_eq!(recent.first().unwrap().listeners, 185);
        assert_eq!(recent.last().unwrap().listeners, 199);
    }
}
