use anyhow::Result;
use rusqlite::Connection;

pub const DAILY_USAGE_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS daily_usage (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    device_id TEXT NOT NULL,
    day TEXT NOT NULL,
    count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE(device_id, day)
);
"#;

pub const FEEDBACK_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS feedback (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    device_id TEXT,
    message TEXT NOT NULL,
    created_at TEXT NOT NULL
);
"#;

pub const DAILY_USAGE_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_daily_usage_device_day ON daily_usage(device_id, day);
"#;

pub fn init_database(conn: &Connection) -> Result<()> {
    conn.execute_batch(DAILY_USAGE_TABLE_SCHEMA)?;
    conn.execute_batch(FEEDBACK_TABLE_SCHEMA)?;
    conn.execute_batch(DAILY_USAGE_INDEXES)?;
    Ok(())
}
