//! Todo server library
//!
//! HTTP routing for the todo tracker. Handlers validate input with
//! `todo_core`, run one store operation, and map the outcome to a response.

pub mod api_error;
pub mod health;
pub mod logging;

use crate::api_error::ApiError;
use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, MethodRouter},
    Router,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use todo_core::{
    database, validate_body, validate_query, LogFormat, Todo, TodoBody, TodoConfig, TodoQuery,
    TodoStore,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "todo-server")]
#[command(about = "HTTP API for tracking todos")]
#[command(version)]
pub struct Cli {
    /// Configuration file (YAML, or JSON with a .json extension)
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Database path
    #[arg(long, short)]
    pub database: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Verbose output
    #[arg(long, short)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Create the todo table if it does not exist
    #[arg(long)]
    pub init_schema: bool,
}

impl Cli {
    /// Resolve the effective configuration: file, then environment, then flags
    ///
    /// # Errors
    /// Returns an error if the file or environment is unreadable or the final
    /// configuration is invalid
    pub fn resolve_config(&self) -> todo_core::Result<TodoConfig> {
        let base = match &self.config {
            Some(path) => TodoConfig::from_file(path)?,
            None => TodoConfig::default(),
        };
        let config = self.apply_overrides(base.apply_env()?);
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line flags on top of a configuration
    #[must_use]
    pub fn apply_overrides(&self, mut config: TodoConfig) -> TodoConfig {
        if let Some(database) = &self.database {
            config.database_path.clone_from(database);
        }
        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.log_json {
            config.log_format = LogFormat::Json;
        }
        config
    }
}

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn TodoStore>,
}

impl AppState {
    pub fn new<S: TodoStore + 'static>(store: S) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Build the router, serving every resource path with and without a trailing slash
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(both_slashes("/todos", get(list_todos).post(create_todo)))
        .merge(both_slashes(
            "/todos/:todo_id",
            get(get_todo).put(update_todo).delete(delete_todo),
        ))
        .merge(both_slashes("/agenda", get(agenda)))
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn both_slashes(path: &str, handler: MethodRouter<AppState>) -> Router<AppState> {
    Router::new()
        .route(path, handler.clone())
        .route(&format!("{path}/"), handler)
}

async fn list_todos(
    State(state): State<AppState>,
    Query(query): Query<TodoQuery>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let query = validate_query(query, None)?;
    let todos = database::list_todos(state.store.as_ref(), &query).await?;
    debug!("Returning {} todos", todos.len());
    Ok(Json(todos))
}

async fn get_todo(
    State(state): State<AppState>,
    Path(todo_id): Path<String>,
    Query(query): Query<TodoQuery>,
) -> Result<Json<Todo>, ApiError> {
    // Filters are checked but a fetch by id does not apply them
    validate_query(query, Some(todo_id.clone()))?;
    let todo = database::get_todo(state.store.as_ref(), &todo_id).await?;
    Ok(Json(todo))
}

async fn agenda(
    State(state): State<AppState>,
    Query(query): Query<TodoQuery>,
) -> Result<Json<Vec<Todo>>, ApiError> {
    let query = validate_query(query, None)?;
    let todos = database::agenda(state.store.as_ref(), &query).await?;
    Ok(Json(todos))
}

async fn create_todo(
    State(state): State<AppState>,
    Json(body): Json<TodoBody>,
) -> Result<&'static str, ApiError> {
    let body = validate_body(body, None)?;
    Ok(database::create_todo(state.store.as_ref(), &body).await?)
}

async fn update_todo(
    State(state): State<AppState>,
    Path(todo_id): Path<String>,
    Json(body): Json<TodoBody>,
) -> Result<&'static str, ApiError> {
    let body = validate_body(body, Some(todo_id))?;
    Ok(database::update_todo(state.store.as_ref(), &body).await?)
}

async fn delete_todo(
    State(state): State<AppState>,
    Path(todo_id): Path<String>,
) -> Result<&'static str, ApiError> {
    Ok(database::delete_todo(state.store.as_ref(), &todo_id).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "todo-server",
            "--database",
            "/tmp/t.db",
            "--port",
            "8081",
            "--verbose",
            "--init-schema",
        ])
        .unwrap();

        assert_eq!(cli.database, Some(PathBuf::from("/tmp/t.db")));
        assert_eq!(cli.port, Some(8081));
        assert!(cli.verbose);
        assert!(cli.init_schema);
        assert!(!cli.log_json);
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "todo-server",
            "--host",
            "0.0.0.0",
            "-p",
            "9000",
            "--log-json",
        ])
        .unwrap();

        let config = cli.apply_overrides(TodoConfig::new("file.db"));
        assert_eq!(config.database_path, PathBuf::from("file.db"));
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_flags_leave_unset_values_alone() {
        let cli = Cli::try_parse_from(["todo-server"]).unwrap();
        let config = cli.apply_overrides(TodoConfig::default());
        assert_eq!(config, TodoConfig::default());
    }
}
