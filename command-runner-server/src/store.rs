use std::str::FromStr;
use std::time::Duration;

use command_runner_api::api::Command;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("command {0} not found")]
    NotFound(i64),
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Persistence of [`Command`]s in the `commands` table.
///
/// Cloning is cheap, all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens a connection pool for the given database url.
    ///
    /// In-memory databases live as long as their connection, so they get
    /// exactly one connection that is never recycled.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .busy_timeout(Duration::from_secs(5));

        let pool = if database_url.contains(":memory:") || database_url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(10)
                .connect_with(options)
                .await?
        };
        log::debug!(url = database_url; "opened database pool");

        Ok(Self { pool })
    }

    /// Creates the `commands` table if it doesn't exist yet.
    pub async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS commands (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT,
                output TEXT
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Stores a new command without output and returns its id.
    pub async fn insert(&self, content: &str) -> Result<i64, StoreError> {
        let result = sqlx::query("INSERT INTO commands (content) VALUES ($1)")
            .bind(content)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_all(&self) -> Result<Vec<Command>, StoreError> {
        let rows: Vec<(i64, String, String)> = sqlx::query_as(
            "SELECT id, COALESCE(content, ''), COALESCE(output, '') FROM commands ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(into_command).collect())
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Command, StoreError> {
        let row: Option<(i64, String, String)> = sqlx::query_as(
            "SELECT id, COALESCE(content, ''), COALESCE(output, '') FROM commands WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_command).ok_or(StoreError::NotFound(id))
    }

    /// Fetches only the shell text of a command.
    pub async fn get_content(&self, id: i64) -> Result<String, StoreError> {
        let content: Option<String> =
            sqlx::query_scalar("SELECT COALESCE(content, '') FROM commands WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        content.ok_or(StoreError::NotFound(id))
    }

    /// Overwrites the output of a command.
    ///
    /// Succeeds without effect if no command has this id.
    pub async fn update_output(&self, id: i64, output: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE commands SET output = $1 WHERE id = $2")
            .bind(output)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            log::debug!(id; "output update matched no command");
        }
        Ok(())
    }

    /// Checks that the database answers.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[cfg(test)]
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn into_command((id, content, output): (i64, String, String)) -> Command {
    Command {
        id,
        content,
        output,
    }
}
