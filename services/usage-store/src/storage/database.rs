use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};

use super::error::StorageError;
use super::schema::init_database;
use super::USAGE_DB_FILENAME;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRow {
    pub device_id: String,
    pub day: NaiveDate,
    pub count: u32,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: i64,
    pub device_id: Option<String>,
    pub message: String,
    pub created_at: String,
}

pub struct UsageDatabase {
    data_dir: PathBuf,
    conn: Mutex<Connection>,
}

impl UsageDatabase {
    pub fn new(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)?;
        let db_path = data_dir.join(USAGE_DB_FILENAME);
        let conn = Connection::open(&db_path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        init_database(&conn)?;

        Ok(Self {
            data_dir,
            conn: Mutex::new(conn),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn fetch_usage(
        &self,
        device_id: &str,
        day: NaiveDate,
    ) -> Result<Option<UsageRow>, StorageError> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT device_id, day, count, updated_at
            FROM daily_usage
            WHERE device_id = ?1 AND day = ?2
            "#,
        )?;

        let row = stmt
            .query_row(params![device_id, day], usage_row)
            .optional()?;

        Ok(row)
    }

    /// Seeds a zero row for `(device_id, day)`. Returns `false` when the row
    /// already existed, in which case its count is left untouched.
    pub fn insert_usage_if_absent(
        &self,
        device_id: &str,
        day: NaiveDate,
    ) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let inserted = conn.execute(
            r#"
            INSERT INTO daily_usage (device_id, day, count, created_at, updated_at)
            VALUES (?1, ?2, 0, ?3, ?3)
            ON CONFLICT(device_id, day) DO NOTHING
            "#,
            params![device_id, day, now],
        )?;

        Ok(inserted > 0)
    }

    /// Last writer wins: the stored count is replaced, never merged.
    pub fn upsert_usage(
        &self,
        device_id: &str,
        day: NaiveDate,
        count: u32,
    ) -> Result<UsageRow, StorageError> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO daily_usage (device_id, day, count, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT(device_id, day) DO UPDATE SET
                count = excluded.count,
                updated_at = excluded.updated_at
            "#,
            params![device_id, day, count, now],
        )?;

        Ok(UsageRow {
            device_id: device_id.to_string(),
            day,
            count,
            updated_at: now,
        })
    }

    pub fn list_device_usage(&self, device_id: &str) -> Result<Vec<UsageRow>, StorageError> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT device_id, day, count, updated_at
            FROM daily_usage
            WHERE device_id = ?1
            ORDER BY day DESC
            "#,
        )?;

        let rows = stmt.query_map(params![device_id], usage_row)?;

        let mut usage = Vec::new();
        for row in rows {
            usage.push(row?);
        }
        Ok(usage)
    }

    pub fn insert_feedback(
        &self,
        device_id: Option<&str>,
        message: &str,
    ) -> Result<FeedbackRecord, StorageError> {
        if message.trim().is_empty() {
            return Err(StorageError::InvalidValue(
                "feedback message cannot be empty".into(),
            ));
        }

        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO feedback (device_id, message, created_at)
            VALUES (?1, ?2, ?3)
            "#,
            params![device_id, message, now],
        )?;

        Ok(FeedbackRecord {
            id: conn.last_insert_rowid(),
            device_id: device_id.map(str::to_string),
            message: message.to_string(),
            created_at: now,
        })
    }

    pub fn recent_feedback(&self, limit: usize) -> Result<Vec<FeedbackRecord>, StorageError> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT id, device_id, message, created_at
            FROM feedback
            ORDER BY id DESC
            LIMIT ?1
            "#,
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(FeedbackRecord {
                id: row.get(0)?,
                device_id: row.get(1)?,
                message: row.get(2)?,
                created_at: row.get(3)?,
            })
        })?;

        let mut feedback = Vec::new();
        for row in rows {
            feedback.push(row?);
        }
        Ok(feedback)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

fn usage_row(row: &Row<'_>) -> rusqlite::Result<UsageRow> {
    Ok(UsageRow {
        device_id: row.get(0)?,
        day: row.get(1)?,
        count: row.get::<_, i64>(2)?.clamp(0, u32::MAX as i64) as u32,
        updated_at: row.get(3)?,
    })
}
