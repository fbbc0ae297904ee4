use crate::{
    database::{
        mappers::map_todo_row,
        query_builders::{
            agenda_by_date, delete_by_id, select_by_id, SingleFieldUpdate, Statement,
            TodoFilterBuilder, TodoInsert,
        },
    },
    error::{Result as TodoResult, TodoError},
    models::{SanitizedBody, SanitizedQuery, Todo},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::{
    pool::PoolOptions,
    query::Query,
    sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqliteJournalMode},
    SqlitePool,
};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

pub const TODO_ADDED: &str = "Todo Successfully Added";
pub const TODO_DELETED: &str = "Todo Deleted";

/// Table layout shared with any existing `todo` database
const CREATE_TODO_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS todo (
        id TEXT PRIMARY KEY,
        todo TEXT,
        priority TEXT,
        status TEXT,
        category TEXT,
        due_date TEXT
    )
";

/// Gateway to the relational store
///
/// Implementations execute already-built statements. Any failure comes back
/// as `TodoError::Database`; callers never see driver-specific errors.
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Run a SELECT and map every row
    async fn query_many(&self, statement: &Statement) -> TodoResult<Vec<Todo>>;

    /// Run a SELECT expected to match at most one row
    async fn query_one(&self, statement: &Statement) -> TodoResult<Option<Todo>>;

    /// Run an INSERT/UPDATE/DELETE and return the affected row count
    async fn execute(&self, statement: &Statement) -> TodoResult<u64>;

    /// Whether the store can currently serve requests
    async fn is_healthy(&self) -> bool {
        true
    }
}

/// Database connection pool configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabasePoolConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections in the pool
    pub min_connections: u32,
    /// Seconds to wait for a free connection
    pub acquire_timeout_secs: u64,
    /// Seconds SQLite waits on a locked database before failing
    pub busy_timeout_secs: u64,
    /// Create the database file if it does not exist
    pub create_if_missing: bool,
}

impl Default for DatabasePoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_secs: 30,
            busy_timeout_secs: 5,
            create_if_missing: true,
        }
    }
}

/// SQLx-backed todo store
///
/// Opened once at startup and shared by cloning (the pool is reference
/// counted internally).
#[derive(Debug, Clone)]
pub struct TodoDatabase {
    pool: SqlitePool,
}

impl TodoDatabase {
    /// Open a pool on a database file with default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened
    #[instrument]
    pub async fn new(database_path: &Path) -> TodoResult<Self> {
        Self::new_with_config(database_path, &DatabasePoolConfig::default()).await
    }

    /// Open a pool on a database file with custom configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened
    #[instrument]
    pub async fn new_with_config(
        database_path: &Path,
        config: &DatabasePoolConfig,
    ) -> TodoResult<Self> {
        info!("Connecting to SQLite database at: {}", database_path.display());

        let options = SqliteConnectOptions::new()
            .filename(database_path)
            .create_if_missing(config.create_if_missing);

        Self::connect(options, config).await
    }

    async fn connect(
        options: SqliteConnectOptions,
        config: &DatabasePoolConfig,
    ) -> TodoResult<Self> {
        let options = options
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(config.busy_timeout_secs));

        let pool = PoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| TodoError::database(format!("Failed to connect to database: {e}")))?;

        info!(
            "Database connection pool established with {} max connections",
            config.max_connections
        );

        Ok(Self { pool })
    }

    /// Get the underlying connection pool
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Check if the database answers a trivial query
    #[instrument(skip(self))]
    pub async fn is_connected(&self) -> bool {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => {
                debug!("Database connection is healthy");
                true
            }
            Err(e) => {
                error!("Database connection check failed: {}", e);
                false
            }
        }
    }

    /// Create the `todo` table if it does not exist yet
    ///
    /// # Errors
    ///
    /// Returns an error if the DDL statement fails
    #[instrument(skip(self))]
    pub async fn create_schema(&self) -> TodoResult<()> {
        sqlx::query(CREATE_TODO_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| TodoError::database(format!("Failed to create todo table: {e}")))?;

        info!("Ensured todo table exists");
        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn bind_params(statement: &Statement) -> Query<'_, Sqlite, SqliteArguments<'_>> {
    statement
        .params
        .iter()
        .fold(sqlx::query(&statement.sql), |query, param| {
            query.bind(param.as_deref())
        })
}

#[async_trait]
impl TodoStore for TodoDatabase {
    #[instrument(skip(self, statement), fields(sql = %statement.sql))]
    async fn query_many(&self, statement: &Statement) -> TodoResult<Vec<Todo>> {
        let rows = bind_params(statement)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TodoError::database(format!("Failed to fetch todos: {e}")))?;

        let todos = rows.iter().map(map_todo_row).collect::<TodoResult<Vec<_>>>()?;
        debug!("Fetched {} todos", todos.len());
        Ok(todos)
    }

    #[instrument(skip(self, statement), fields(sql = %statement.sql))]
    async fn query_one(&self, statement: &Statement) -> TodoResult<Option<Todo>> {
        let row = bind_params(statement)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TodoError::database(format!("Failed to fetch todo: {e}")))?;

        row.as_ref().map(map_todo_row).transpose()
    }

    #[instrument(skip(self, statement), fields(sql = %statement.sql))]
    async fn execute(&self, statement: &Statement) -> TodoResult<u64> {
        let result = bind_params(statement)
            .execute(&self.pool)
            .await
            .map_err(|e| TodoError::database(format!("Failed to execute statement: {e}")))?;

        debug!("Statement affected {} rows", result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn is_healthy(&self) -> bool {
        self.is_connected().await
    }
}

/// List todos matching every filter present in the query
///
/// # Errors
///
/// Returns an error if the store fails
pub async fn list_todos(store: &dyn TodoStore, query: &SanitizedQuery) -> TodoResult<Vec<Todo>> {
    let builder = TodoFilterBuilder::from_query(query);
    debug!(filters = ?builder.names(), "Listing todos");
    store.query_many(&builder.build()).await
}

/// Fetch one todo by id
///
/// # Errors
///
/// Returns `TodoError::NotFound` if no row has this id, or an error if the store fails
pub async fn get_todo(store: &dyn TodoStore, todo_id: &str) -> TodoResult<Todo> {
    store
        .query_one(&select_by_id(todo_id))
        .await?
        .ok_or_else(|| TodoError::not_found(todo_id))
}

/// Todos due on the query's date
///
/// # Errors
///
/// Returns an error if the store fails
pub async fn agenda(store: &dyn TodoStore, query: &SanitizedQuery) -> TodoResult<Vec<Todo>> {
    store.query_many(&agenda_by_date(query.date.as_deref())).await
}

/// Insert a new todo from a validated body
///
/// # Errors
///
/// Returns a validation error if a required field is missing (the store is
/// not called), or an error if the store rejects the row (for example a
/// duplicate id)
pub async fn create_todo(store: &dyn TodoStore, body: &SanitizedBody) -> TodoResult<&'static str> {
    let insert = TodoInsert::from_body(body)?;
    store.execute(&insert.build()).await?;
    info!(id = insert.id(), "Created todo");
    Ok(TODO_ADDED)
}

/// Update the single field selected from a validated body
///
/// # Errors
///
/// Returns a validation error if the body has no updatable field (the store is
/// not called), or an error if the store fails
pub async fn update_todo(store: &dyn TodoStore, body: &SanitizedBody) -> TodoResult<&'static str> {
    let update = SingleFieldUpdate::from_body(body)?;
    let affected = store.execute(&update.build()).await?;

    if affected == 0 {
        warn!(todo_id = ?body.todo_id, field = ?update.field(), "Update matched no todo");
    } else {
        info!(todo_id = ?body.todo_id, field = ?update.field(), "Updated todo");
    }
    Ok(update.message())
}

/// Delete a todo by id
///
/// # Errors
///
/// Returns an error if the store fails
pub async fn delete_todo(store: &dyn TodoStore, todo_id: &str) -> TodoResult<&'static str> {
    let affected = store.execute(&delete_by_id(todo_id)).await?;
    debug!(todo_id, affected, "Deleted todo");
    Ok(TODO_DELETED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::SpyStore;

    #[tokio::test]
    async fn test_update_without_field_skips_store() {
        let store = SpyStore::default();
        let body = SanitizedBody {
            todo_id: Some("1".to_string()),
            ..SanitizedBody::default()
        };

        let result = update_todo(&store, &body).await;
        assert!(matches!(result, Err(TodoError::Validation { .. })));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_update_issues_single_statement() {
        let store = SpyStore::default();
        let body = SanitizedBody {
            todo_id: Some("1".to_string()),
            priority: Some("HIGH".to_string()),
            todo: Some("ignored".to_string()).into(),
            ..SanitizedBody::default()
        };

        let message = update_todo(&store, &body).await.unwrap();
        assert_eq!(message, "Priority Updated");

        let statements = store.statements();
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].sql, "UPDATE todo SET priority = ? WHERE id = ?");
    }

    #[tokio::test]
    async fn test_create_without_enumerations_skips_store() {
        let store = SpyStore::default();
        let body = SanitizedBody {
            id: Some("77".to_string()),
            ..SanitizedBody::default()
        };

        let result = create_todo(&store, &body).await;
        assert!(
            matches!(result, Err(TodoError::Validation { message }) if message == "Invalid Todo Category")
        );
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_create_issues_one_insert() {
        let store = SpyStore::default();
        let body = SanitizedBody {
            id: Some("8".to_string()),
            category: Some("WORK".to_string()),
            priority: Some("HIGH".to_string()),
            status: Some("TO DO".to_string()),
            ..SanitizedBody::default()
        };

        assert_eq!(create_todo(&store, &body).await.unwrap(), TODO_ADDED);
        let statements = store.statements();
        assert_eq!(statements.len(), 1);
        assert!(statements[0].sql.starts_with("INSERT INTO todo"));
    }

    #[tokio::test]
    async fn test_get_todo_maps_missing_row_to_not_found() {
        let store = SpyStore::default();
        let result = get_todo(&store, "missing").await;
        assert!(matches!(result, Err(TodoError::NotFound { id }) if id == "missing"));
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated() {
        let store = SpyStore::failing();
        let result = list_todos(&store, &SanitizedQuery::default()).await;
        assert!(matches!(result, Err(TodoError::Database(_))));
    }

    #[test]
    fn test_pool_config_defaults() {
        let config = DatabasePoolConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert!(config.create_if_missing);
    }
}
