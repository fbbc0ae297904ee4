//! SQL statement construction for the `todo` table
//!
//! Every value reaches the store through a `?` placeholder. Statement text is
//! assembled only from the fixed clauses in this module.

use crate::{
    database::validators::{INVALID_CATEGORY, INVALID_PRIORITY, INVALID_STATUS},
    error::{Result as TodoResult, TodoError},
    models::{SanitizedBody, SanitizedQuery, UpdatableField},
};

/// Columns returned for every todo read, in wire order
pub const TODO_COLUMNS: &str = "id, todo, priority, status, category, due_date";

pub const NO_UPDATABLE_FIELD: &str = "No valid fields found for update";
pub const INVALID_ID: &str = "Invalid Todo Id";

const SEARCH_CLAUSE: &str = "todo LIKE '%' || ? || '%'";
const CATEGORY_CLAUSE: &str = "category = ?";
const PRIORITY_CLAUSE: &str = "priority = ?";
const STATUS_CLAUSE: &str = "status = ?";
const DUE_DATE_CLAUSE: &str = "due_date = ?";

/// A statement and the values bound to its placeholders, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Option<String>>,
}

impl Statement {
    fn new(sql: impl Into<String>, params: Vec<Option<String>>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// One `column <op> ?` predicate and the value bound to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    /// Parameter name, used for logging
    pub name: &'static str,
    pub clause: &'static str,
    pub value: String,
}

/// Builder for the conjunctive WHERE clause of list queries
#[derive(Debug, Clone, Default)]
pub struct TodoFilterBuilder {
    predicates: Vec<Predicate>,
}

impl TodoFilterBuilder {
    /// Create an empty builder (matches every row)
    #[must_use]
    pub fn new() -> Self {
        Self {
            predicates: Vec::new(),
        }
    }

    /// Create a builder with one predicate per filter present in the query
    ///
    /// An empty `search_q` adds nothing.
    #[must_use]
    pub fn from_query(query: &SanitizedQuery) -> Self {
        let mut builder = Self::new();

        if let Some(search_q) = query.search_q.as_deref().filter(|q| !q.is_empty()) {
            builder = builder.add_predicate("search_q", SEARCH_CLAUSE, search_q);
        }

        if let Some(category) = &query.category {
            builder = builder.add_predicate("category", CATEGORY_CLAUSE, category);
        }

        if let Some(priority) = &query.priority {
            builder = builder.add_predicate("priority", PRIORITY_CLAUSE, priority);
        }

        if let Some(status) = &query.status {
            builder = builder.add_predicate("status", STATUS_CLAUSE, status);
        }

        if let Some(date) = &query.date {
            builder = builder.add_predicate("dueDate", DUE_DATE_CLAUSE, date);
        }

        builder
    }

    /// Add a predicate to the AND list
    #[must_use]
    pub fn add_predicate(mut self, name: &'static str, clause: &'static str, value: &str) -> Self {
        self.predicates.push(Predicate {
            name,
            clause,
            value: value.to_string(),
        });
        self
    }

    /// Check if any predicates have been added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Get the number of predicates
    #[must_use]
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Parameter names in binding order
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.predicates.iter().map(|p| p.name).collect()
    }

    /// Build the complete SELECT statement
    #[must_use]
    pub fn build(&self) -> Statement {
        let mut sql = format!("SELECT {TODO_COLUMNS} FROM todo");

        if !self.predicates.is_empty() {
            let clauses: Vec<&str> = self.predicates.iter().map(|p| p.clause).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let params = self
            .predicates
            .iter()
            .map(|p| Some(p.value.clone()))
            .collect();

        Statement::new(sql, params)
    }
}

/// SELECT for a single todo by id
#[must_use]
pub fn select_by_id(todo_id: &str) -> Statement {
    Statement::new(
        format!("SELECT {TODO_COLUMNS} FROM todo WHERE id = ?"),
        vec![Some(todo_id.to_string())],
    )
}

/// SELECT for the agenda view
///
/// A missing date binds NULL, which matches no row.
#[must_use]
pub fn agenda_by_date(date: Option<&str>) -> Statement {
    Statement::new(
        format!("SELECT {TODO_COLUMNS} FROM todo WHERE {DUE_DATE_CLAUSE}"),
        vec![date.map(str::to_string)],
    )
}

/// INSERT of a full record
///
/// `id`, `category`, `priority` and `status` are required; `todo` and the
/// due date may be NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoInsert {
    id: String,
    todo: Option<String>,
    priority: String,
    status: String,
    category: String,
    due_date: Option<String>,
}

impl TodoInsert {
    /// Check a validated body has every required field
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first missing field, in the order
    /// id, category, priority, status
    pub fn from_body(body: &SanitizedBody) -> TodoResult<Self> {
        Ok(Self {
            id: required(body.id.as_ref(), INVALID_ID)?,
            category: required(body.category.as_ref(), INVALID_CATEGORY)?,
            priority: required(body.priority.as_ref(), INVALID_PRIORITY)?,
            status: required(body.status.as_ref(), INVALID_STATUS)?,
            todo: body.todo.as_deref().map(str::to_string),
            due_date: body.due_date.clone(),
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Build the INSERT statement, binding in column order
    #[must_use]
    pub fn build(&self) -> Statement {
        Statement::new(
            "INSERT INTO todo (id, todo, priority, status, category, due_date) VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                Some(self.id.clone()),
                self.todo.clone(),
                Some(self.priority.clone()),
                Some(self.status.clone()),
                Some(self.category.clone()),
                self.due_date.clone(),
            ],
        )
    }
}

fn required(value: Option<&String>, message: &'static str) -> TodoResult<String> {
    value
        .cloned()
        .ok_or_else(|| TodoError::validation(message))
}

/// DELETE by id
#[must_use]
pub fn delete_by_id(todo_id: &str) -> Statement {
    Statement::new(
        "DELETE FROM todo WHERE id = ?",
        vec![Some(todo_id.to_string())],
    )
}

/// An UPDATE that changes exactly one column
///
/// The column is the first of [`UpdatableField::SCAN_ORDER`] present in the
/// body. Any other fields in the same body are not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleFieldUpdate {
    field: UpdatableField,
    value: Option<String>,
    todo_id: Option<String>,
}

impl SingleFieldUpdate {
    /// Select the field to update from a validated body
    ///
    /// # Errors
    ///
    /// Returns a validation error if no updatable field is present
    pub fn from_body(body: &SanitizedBody) -> TodoResult<Self> {
        UpdatableField::SCAN_ORDER
            .iter()
            .find_map(|&field| {
                field.value_in(body).map(|value| Self {
                    field,
                    value: value.map(str::to_string),
                    todo_id: body.todo_id.clone(),
                })
            })
            .ok_or_else(|| TodoError::validation(NO_UPDATABLE_FIELD))
    }

    #[must_use]
    pub fn field(&self) -> UpdatableField {
        self.field
    }

    /// Confirmation text for the client
    #[must_use]
    pub fn message(&self) -> &'static str {
        self.field.confirmation()
    }

    /// Build the UPDATE statement
    #[must_use]
    pub fn build(&self) -> Statement {
        Statement::new(
            format!("UPDATE todo SET {} = ? WHERE id = ?", self.field.column()),
            vec![self.value.clone(), self.todo_id.clone()],
        )
    }
}
