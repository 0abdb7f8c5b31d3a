//! Read-only database access for grepdb.
//!
//! Records are read from SQLite through a small pool and filtered with the
//! caller's compiled pattern. Which tables and columns exist is described
//! by [`Schema`], never discovered at runtime.
//!
//! # Usage
//!
//! ```rust,ignore
//! use grepdb_db::{GrepDb, Result};
//!
//! let db = GrepDb::open_existing("app.sqlite3").await?;
//! let model = schema.model("tests", "TestModel")?;
//! let records = db.find_matching(model, "text_field", &regex).await?;
//! ```

mod error;
pub mod schema;
mod search;
mod types;

pub use error::{DbError, Result};
pub use schema::{FieldDef, FieldKind, ModelDef, ModelSpec, Schema};
pub use types::Record;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::info;

/// Handle to the searched database.
#[derive(Clone, Debug)]
pub struct GrepDb {
    pool: SqlitePool,
}

impl GrepDb {
    /// Open an existing database read-only (fails if it does not exist).
    pub async fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DbError::not_found(format!(
                "Database not found: {}",
                path.display()
            )));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        info!(path = %path.display(), "Database opened");

        Ok(Self { pool })
    }

    /// Close the database connection.
    pub async fn close(self) {
        self.pool.close().await;
    }
}
