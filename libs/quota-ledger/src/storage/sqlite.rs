use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{StorageError, StorageProvider, LOCAL_DB_FILENAME};

const LOCAL_STORAGE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS local_storage (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(data_dir)?;
        let conn = Connection::open(data_dir.join(LOCAL_DB_FILENAME))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.execute_batch(LOCAL_STORAGE_SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl StorageProvider for SqliteStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;

        let value = conn
            .query_row(
                "SELECT value FROM local_storage WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::Poisoned)?;
        let now = Utc::now().to_rfc3339();

        conn.execute(
            r#"
            INSERT INTO local_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, now],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let storage = SqliteStorage::open(dir.path()).unwrap();
            assert_eq!(storage.get("qx_theme").unwrap(), None);
            storage.set("qx_theme", "light").unwrap();
            storage.set("qx_theme", "dark").unwrap();
        }

        let storage = SqliteStorage::open(dir.path()).unwrap();
        assert_eq!(storage.get("qx_theme").unwrap().as_deref(), Some("dark"));
    }
}
