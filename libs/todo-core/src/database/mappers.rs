//! Row mapping from SQLite results to `Todo`

use crate::{error::Result as TodoResult, models::Todo};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Map a database row to a Todo struct
///
/// Expects the columns listed in `query_builders::TODO_COLUMNS`.
///
/// # Errors
///
/// Returns an error if a column is missing or holds a non-text value
pub fn map_todo_row(row: &SqliteRow) -> TodoResult<Todo> {
    Ok(Todo {
        id: row.try_get("id")?,
        todo: row.try_get("todo")?,
        priority: row.try_get("priority")?,
        status: row.try_get("status")?,
        category: row.try_get("category")?,
        due_date: row.try_get("due_date")?,
    })
}
