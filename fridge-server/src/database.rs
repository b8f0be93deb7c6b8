use anyhow::{Context, Result};

#[derive(Clone)]
pub struct Database {
    pub pool: r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>,
}

impl Database {
    /// Open (creating if needed) the database file and bring its schema up to date.
    pub async fn connect(path: &str) -> Result<Self> {
        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Creating database directory for {path}"))?;
            }
        }
        let manager = r2d2_sqlite::SqliteConnectionManager::file(path);
        let pool = r2d2::Pool::new(manager)?;
        let me = Self { pool };
        me.migrate().await?;
        Ok(me)
    }

    /// Migrate the database to the latest version.
    async fn migrate(&self) -> Result<()> {
        let migrations = [include_str!("migrations/01-initial.sql")];
        // A missing metadata table means a fresh database.
        let conn = self.pool.get()?;
        let current_version: String = conn
            .query_row(
                "SELECT value FROM metadata WHERE key = 'schema_version'",
                rusqlite::params![],
                |row| row.get(0),
            )
            .unwrap_or("0".to_string());
        let current_version = current_version.parse::<usize>().unwrap_or(0);
        tracing::info!("Current schema version: {}", current_version);
        for (offset, migration) in migrations.iter().enumerate().skip(current_version) {
            tracing::warn!("Applying migration {}", offset + 1);
            conn.execute_batch(migration)?;
        }
        Ok(())
    }

    pub fn schema_version(&self) -> Result<u32> {
        let conn = self.pool.get()?;
        let version: String = conn.query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            rusqlite::params![],
            |row| row.get(0),
        )?;
        Ok(version.parse()?)
    }

    /// Convenience method to collect rows from a query into a Vec.
    pub fn collect_rows<T: FromRow, P: rusqlite::Params>(
        &self,
        sql: &str,
        parameters: P,
    ) -> Result<Vec<T>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query(parameters)?;
        rows.mapped(T::from_row)
            .map(|r| r.map_err(Into::into))
            .collect::<Result<_>>()
    }

    /// Run a single statement, returning the number of rows changed.
    pub fn execute<P: rusqlite::Params>(&self, sql: &str, parameters: P) -> Result<usize> {
        let conn = self.pool.get()?;
        Ok(conn.execute(sql, parameters)?)
    }
}

pub trait FromRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_run_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/fridge.db");
        let path = path.to_str().unwrap();
        let db = Database::connect(path).await.unwrap();
        assert_eq!(db.schema_version().unwrap(), 1);
        db.execute(
            "INSERT INTO Image (image_id, url, created_on) VALUES ('a', 'b', 'c')",
            [],
        )
        .unwrap();
        drop(db);

        // Reopening must not re-run the initial migration over existing data.
        let db = Database::connect(path).await.unwrap();
        assert_eq!(db.schema_version().unwrap(), 1);
        let count: i64 = db
            .pool
            .get()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM Image", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
