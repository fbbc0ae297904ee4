//! Todo Core - validation, statement building and SQLite access for todos
//!
//! Everything between an HTTP request and the `todo` table lives here:
//!
//! - **Date normalization**: loose date strings become `YYYY-MM-DD`
//! - **Request validation**: enumeration checks for category, priority and status
//! - **Statement building**: dynamic filters and single-field updates with
//!   positional parameters only
//! - **Store access**: the [`TodoStore`] trait and its SQLx implementation
//!
//! # Quick Start
//!
//! ```no_run
//! use todo_core::{database, validate_query, TodoDatabase, TodoError, TodoQuery};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), TodoError> {
//! let db = TodoDatabase::new(Path::new("todoApplication.db")).await?;
//!
//! let query = TodoQuery {
//!     priority: Some("HIGH".to_string()),
//!     ..TodoQuery::default()
//! };
//! let sanitized = validate_query(query, None)?;
//! let todos = database::list_todos(&db, &sanitized).await?;
//! println!("Found {} high priority todos", todos.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod test_utils;

pub use config::{LogFormat, TodoConfig};
pub use database::{
    normalize_date, validate_body, validate_query, DatabasePoolConfig, SingleFieldUpdate,
    Statement, TodoDatabase, TodoFilterBuilder, TodoInsert, TodoStore,
};
pub use error::{Result, TodoError};
pub use models::*;
