use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::Text;

use std::time::Duration;

use chirp_core::{Database, Result};

pub type DatabasePool = Pool<ConnectionManager<SqliteConnection>>;

const CREATE_TABLES: &str = include_str!("../../migrations/2024-05-01-000000_create_feed/up.sql");

#[derive(QueryableByName)]
struct TableName {
    #[diesel(sql_type = Text)]
    #[allow(dead_code)]
    name: String,
}

/// Create the tables if the database is still empty.
/// Databases managed by the diesel CLI already have them, so this is a no-op there.
pub fn ensure_schema(db: Database) -> Result<bool> {
    let existing = diesel::sql_query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'tweet'")
        .load::<TableName>(db)?;
    if !existing.is_empty() {
        return Ok(false);
    }
    db.batch_execute(CREATE_TABLES)?;
    tracing::info!("Created database tables");
    Ok(true)
}

/// https://stackoverflow.com/questions/57123453/how-to-use-diesel-with-sqlite-connections-and-avoid-database-is-locked-type-of
#[derive(Debug)]
pub struct ConnectionOptions {
    pub enable_wal: bool,
    pub enable_foreign_keys: bool,
    pub busy_timeout: Option<Duration>,
    /// Create the tables on a fresh database, mostly for in-memory databases.
    pub ensure_schema: bool,
}

impl diesel::r2d2::CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> std::result::Result<(), diesel::r2d2::Error> {
        (|| {
            if self.enable_foreign_keys {
                conn.batch_execute("PRAGMA foreign_keys = ON;")?;
            }
            if let Some(d) = self.busy_timeout {
                conn.batch_execute(&format!("PRAGMA busy_timeout = {};", d.as_millis()))?;
            }
            if self.enable_wal {
                conn.batch_execute("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
            }
            Ok(())
        })()
        .map_err(diesel::r2d2::Error::QueryError)?;

        if self.ensure_schema {
            ensure_schema(conn).map_err(|e| match e {
                chirp_core::Error::DatabaseError(e) => diesel::r2d2::Error::QueryError(e),
                e => diesel::r2d2::Error::QueryError(diesel::result::Error::QueryBuilderError(e.to_string().into())),
            })?;
        }
        Ok(())
    }
}

/// A single-connection pool over an in-memory database with all tables created.
/// Every pool gets its own isolated database.
pub fn memory_pool() -> Result<DatabasePool> {
    let pool = Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_customizer(Box::new(ConnectionOptions {
            enable_wal: false,
            enable_foreign_keys: true,
            busy_timeout: None,
            ensure_schema: true,
        }))
        .build(ConnectionManager::<SqliteConnection>::new(":memory:"))
        .map_err(anyhow::Error::from)?;
    Ok(pool)
}
