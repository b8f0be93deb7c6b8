use crate::database::{Database, FromRow};
use anyhow::Result;
use rusqlite::params;
use serde::Serialize;

pub fn sqlite_current_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// A stored fridge scan. The payload is kept as the exact JSON text the client sent.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ScanRecord {
    pub hash: String,
    pub payload: String,
    pub created_on: String,
}

impl FromRow for ScanRecord {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            hash: row.get("hash")?,
            payload: row.get("payload")?,
            created_on: row.get("created_on")?,
        })
    }
}

impl ScanRecord {
    pub fn get(db: &Database, hash: &str) -> Result<Option<Self>> {
        Ok(db
            .collect_rows("SELECT * FROM Scan WHERE hash = ?", params![hash])?
            .pop())
    }

    /// Store a scan, replacing any earlier one with the same hash.
    pub fn push(db: &Database, hash: &str, payload: &str) -> Result<()> {
        db.execute(
            "INSERT OR REPLACE INTO Scan (hash, payload, created_on) VALUES (?, ?, ?)",
            params![hash, payload, sqlite_current_timestamp()],
        )?;
        Ok(())
    }
}

/// A generated picture, usually a whole data url.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ImageRecord {
    pub image_id: String,
    pub url: String,
    pub created_on: String,
}

impl FromRow for ImageRecord {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            image_id: row.get("image_id")?,
            url: row.get("url")?,
            created_on: row.get("created_on")?,
        })
    }
}

impl ImageRecord {
    pub fn get(db: &Database, image_id: &str) -> Result<Option<Self>> {
        Ok(db
            .collect_rows("SELECT * FROM Image WHERE image_id = ?", params![image_id])?
            .pop())
    }

    pub fn push(db: &Database, image_id: &str, url: &str) -> Result<()> {
        db.execute(
            "INSERT OR REPLACE INTO Image (image_id, url, created_on) VALUES (?, ?, ?)",
            params![image_id, url, sqlite_current_timestamp()],
        )?;
        Ok(())
    }
}
