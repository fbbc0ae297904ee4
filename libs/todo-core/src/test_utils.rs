//! Test utilities and mock data for the todo store

use crate::{
    database::{query_builders::Statement, DatabasePoolConfig, TodoDatabase, TodoStore},
    error::{Result as TodoResult, TodoError},
    models::Todo,
};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a database file with the `todo` table and mock rows
///
/// # Errors
/// Returns `TodoError::Database` if the database cannot be created or seeded
pub async fn create_test_database<P: AsRef<Path>>(db_path: P) -> TodoResult<TodoDatabase> {
    let config = DatabasePoolConfig {
        max_connections: 2,
        ..DatabasePoolConfig::default()
    };
    let db = TodoDatabase::new_with_config(db_path.as_ref(), &config).await?;
    db.create_schema().await?;
    insert_mock_data(&db).await?;
    Ok(db)
}

/// Create a seeded database in a fresh temporary directory
///
/// The directory is removed when the returned `TempDir` is dropped, so keep
/// it alive for as long as the database is used.
///
/// # Errors
/// Returns an error if the directory or the database cannot be created
pub async fn temp_database() -> TodoResult<(TempDir, TodoDatabase)> {
    let dir = TempDir::new()?;
    let db = create_test_database(dir.path().join("todos.db")).await?;
    Ok((dir, db))
}

/// Rows inserted by [`create_test_database`]
#[must_use]
pub fn mock_todos() -> Vec<Todo> {
    vec![
        todo("1", "Learn Rust ownership", "HIGH", "TO DO", "LEARNING", "2021-02-22"),
        todo("2", "Buy milk", "LOW", "DONE", "HOME", "2021-01-01"),
        todo("3", "Ship release notes", "MEDIUM", "IN PROGRESS", "WORK", "2021-01-01"),
        todo("4", "Clean the garage", "LOW", "TO DO", "HOME", "2021-04-02"),
        todo("5", "Review pull requests", "HIGH", "TO DO", "WORK", "2021-02-22"),
    ]
}

fn todo(id: &str, text: &str, priority: &str, status: &str, category: &str, due: &str) -> Todo {
    Todo {
        id: id.to_string(),
        todo: Some(text.to_string()),
        priority: Some(priority.to_string()),
        status: Some(status.to_string()),
        category: Some(category.to_string()),
        due_date: Some(due.to_string()),
    }
}

async fn insert_mock_data(db: &TodoDatabase) -> TodoResult<()> {
    for t in mock_todos() {
        sqlx::query(
            "INSERT INTO todo (id, todo, priority, status, category, due_date) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&t.id)
        .bind(&t.todo)
        .bind(&t.priority)
        .bind(&t.status)
        .bind(&t.category)
        .bind(&t.due_date)
        .execute(db.pool())
        .await?;
    }
    Ok(())
}

/// In-memory `TodoStore` that records every statement it receives
///
/// Reads return the configured rows unfiltered, except `query_one`, which
/// looks the first bound parameter up as an id.
#[derive(Debug, Default)]
pub struct SpyStore {
    todos: Vec<Todo>,
    fail: bool,
    statements: Mutex<Vec<Statement>>,
}

impl SpyStore {
    /// A spy whose reads return these rows
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos,
            ..Self::default()
        }
    }

    /// A spy whose every call fails with a database error
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Statements received so far
    #[must_use]
    pub fn statements(&self) -> Vec<Statement> {
        self.statements
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }

    /// Number of store calls so far
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.statements().len()
    }

    fn record(&self, statement: &Statement) -> TodoResult<()> {
        if let Ok(mut statements) = self.statements.lock() {
            statements.push(statement.clone());
        }
        if self.fail {
            return Err(TodoError::database("spy store configured to fail"));
        }
        Ok(())
    }
}

#[async_trait]
impl TodoStore for SpyStore {
    async fn query_many(&self, statement: &Statement) -> TodoResult<Vec<Todo>> {
        self.record(statement)?;
        Ok(self.todos.clone())
    }

    async fn query_one(&self, statement: &Statement) -> TodoResult<Option<Todo>> {
        self.record(statement)?;
        let id = statement.params.first().cloned().flatten();
        Ok(self
            .todos
            .iter()
            .find(|t| Some(&t.id) == id.as_ref())
            .cloned())
    }

    async fn execute(&self, statement: &Statement) -> TodoResult<u64> {
        self.record(statement)?;
        Ok(1)
    }

    async fn is_healthy(&self) -> bool {
        !self.fail
    }
}
