//! Request validation for the read and write paths
//!
//! Both validators check fields in a fixed order (category, priority, status,
//! date) and stop at the first violation. Nothing here touches the store.

use crate::{
    database::date_utils::normalize_date,
    error::{Result as TodoResult, TodoError},
    models::{
        BodyField, SanitizedBody, SanitizedQuery, TodoBody, TodoQuery, CATEGORIES, PRIORITIES,
        STATUSES,
    },
};
use tracing::debug;

pub const INVALID_CATEGORY: &str = "Invalid Todo Category";
pub const INVALID_PRIORITY: &str = "Invalid Todo Priority";
pub const INVALID_STATUS: &str = "Invalid Todo Status";
pub const INVALID_DUE_DATE: &str = "Invalid Due Date";

/// A closed set of accepted values and the message used to reject others
#[derive(Debug, Clone, Copy)]
pub struct MembershipRule {
    pub field: &'static str,
    pub allowed: &'static [&'static str],
    pub message: &'static str,
}

impl MembershipRule {
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        self.allowed.contains(&value)
    }

    /// Pass a missing value through; reject `null` or a value outside the set
    ///
    /// # Errors
    ///
    /// Returns a validation error carrying this rule's message
    pub fn check(&self, value: impl Into<BodyField>) -> TodoResult<Option<String>> {
        match value.into() {
            BodyField::Missing => Ok(None),
            BodyField::Value(v) if self.accepts(&v) => Ok(Some(v)),
            BodyField::Value(v) => {
                debug!(field = self.field, value = %v, "rejected value outside allowed set");
                Err(TodoError::validation(self.message))
            }
            BodyField::Null => {
                debug!(field = self.field, "rejected null value");
                Err(TodoError::validation(self.message))
            }
        }
    }
}

pub const CATEGORY_RULE: MembershipRule = MembershipRule {
    field: "category",
    allowed: CATEGORIES,
    message: INVALID_CATEGORY,
};

pub const PRIORITY_RULE: MembershipRule = MembershipRule {
    field: "priority",
    allowed: PRIORITIES,
    message: INVALID_PRIORITY,
};

pub const STATUS_RULE: MembershipRule = MembershipRule {
    field: "status",
    allowed: STATUSES,
    message: INVALID_STATUS,
};

/// Normalize a present date; `null` or an unparseable one is an error, not "absent"
fn check_date(field: &'static str, value: impl Into<BodyField>) -> TodoResult<Option<String>> {
    match value.into() {
        BodyField::Missing => Ok(None),
        BodyField::Value(raw) => match normalize_date(Some(&raw)) {
            Some(canonical) => Ok(Some(canonical)),
            None => {
                debug!(field, value = %raw, "rejected unparseable date");
                Err(TodoError::validation(INVALID_DUE_DATE))
            }
        },
        BodyField::Null => {
            debug!(field, "rejected null date");
            Err(TodoError::validation(INVALID_DUE_DATE))
        }
    }
}

/// Validate read-path query parameters
///
/// `search_q` and `todo_id` are carried through unchecked.
///
/// # Errors
///
/// Returns `TodoError::Validation` naming the first field that failed
pub fn validate_query(raw: TodoQuery, todo_id: Option<String>) -> TodoResult<SanitizedQuery> {
    let category = CATEGORY_RULE.check(raw.category)?;
    let priority = PRIORITY_RULE.check(raw.priority)?;
    let status = STATUS_RULE.check(raw.status)?;
    let date = check_date("date", raw.date)?;

    Ok(SanitizedQuery {
        todo_id,
        search_q: raw.search_q,
        category,
        priority,
        status,
        date,
    })
}

/// Validate write-path body fields for create and update
///
/// `id` and `todo` are carried through unchecked; a `null` `todo` stays
/// present. Which fields are required is up to the caller.
///
/// # Errors
///
/// Returns `TodoError::Validation` naming the first field that failed
pub fn validate_body(raw: TodoBody, todo_id: Option<String>) -> TodoResult<SanitizedBody> {
    let category = CATEGORY_RULE.check(raw.category)?;
    let priority = PRIORITY_RULE.check(raw.priority)?;
    let status = STATUS_RULE.check(raw.status)?;
    let due_date = check_date("dueDate", raw.due_date)?;

    Ok(SanitizedBody {
        todo_id,
        id: raw.id.into_value(),
        todo: raw.todo,
        category,
        priority,
        status,
        due_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(err: TodoError) -> String {
        match err {
            TodoError::Validation { message } => message,
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_query_passes_with_ids_carried() {
        let sanitized = validate_query(TodoQuery::default(), Some("7".to_string())).unwrap();
        assert_eq!(sanitized.todo_id.as_deref(), Some("7"));
        assert!(sanitized.search_q.is_none());
        assert!(sanitized.category.is_none());
        assert!(sanitized.date.is_none());
    }

    #[test]
    fn test_valid_query_is_sanitized() {
        let raw = TodoQuery {
            search_q: Some("milk".to_string()),
            category: Some("HOME".to_string()),
            priority: Some("LOW".to_string()),
            status: Some("IN PROGRESS".to_string()),
            date: Some("2021-1-1".to_string()),
        };

        let sanitized = validate_query(raw, None).unwrap();
        assert_eq!(sanitized.search_q.as_deref(), Some("milk"));
        assert_eq!(sanitized.category.as_deref(), Some("HOME"));
        assert_eq!(sanitized.priority.as_deref(), Some("LOW"));
        assert_eq!(sanitized.status.as_deref(), Some("IN PROGRESS"));
        assert_eq!(sanitized.date.as_deref(), Some("2021-01-01"));
    }

    #[test]
    fn test_each_field_reports_its_own_message() {
        let bad_category = TodoQuery {
            category: Some("GARDEN".to_string()),
            ..TodoQuery::default()
        };
        let bad_priority = TodoQuery {
            priority: Some("URGENT".to_string()),
            ..TodoQuery::default()
        };
        let bad_status = TodoQuery {
            status: Some("todo".to_string()),
            ..TodoQuery::default()
        };
        let bad_date = TodoQuery {
            date: Some("2023-02-30".to_string()),
            ..TodoQuery::default()
        };

        assert_eq!(message(validate_query(bad_category, None).unwrap_err()), INVALID_CATEGORY);
        assert_eq!(message(validate_query(bad_priority, None).unwrap_err()), INVALID_PRIORITY);
        assert_eq!(message(validate_query(bad_status, None).unwrap_err()), INVALID_STATUS);
        assert_eq!(message(validate_query(bad_date, None).unwrap_err()), INVALID_DUE_DATE);
    }

    #[test]
    fn test_first_failing_field_wins() {
        let raw = TodoQuery {
            category: Some("GARDEN".to_string()),
            priority: Some("URGENT".to_string()),
            status: Some("nope".to_string()),
            date: Some("never".to_string()),
            ..TodoQuery::default()
        };
        assert_eq!(message(validate_query(raw, None).unwrap_err()), INVALID_CATEGORY);

        let raw = TodoQuery {
            priority: Some("URGENT".to_string()),
            status: Some("nope".to_string()),
            ..TodoQuery::default()
        };
        assert_eq!(message(validate_query(raw, None).unwrap_err()), INVALID_PRIORITY);
    }

    #[test]
    fn test_membership_is_case_sensitive() {
        assert!(!CATEGORY_RULE.accepts("work"));
        assert!(STATUS_RULE.accepts("TO DO"));
        assert!(!STATUS_RULE.accepts("TODO"));
    }

    #[test]
    fn test_empty_date_is_invalid_not_absent() {
        let raw = TodoQuery {
            date: Some(String::new()),
            ..TodoQuery::default()
        };
        assert_eq!(message(validate_query(raw, None).unwrap_err()), INVALID_DUE_DATE);
    }

    #[test]
    fn test_body_passes_id_and_todo_unchecked() {
        let raw = TodoBody {
            id: BodyField::from(""),
            todo: "x".repeat(10_000).into(),
            ..TodoBody::default()
        };

        let sanitized = validate_body(raw, Some("3".to_string())).unwrap();
        assert_eq!(sanitized.id.as_deref(), Some(""));
        assert_eq!(sanitized.todo.as_deref().map(str::len), Some(10_000));
        assert_eq!(sanitized.todo_id.as_deref(), Some("3"));
    }

    #[test]
    fn test_body_due_date_is_normalized() {
        let raw = TodoBody {
            due_date: "2021-02-03T10:00:00Z".into(),
            ..TodoBody::default()
        };
        let sanitized = validate_body(raw, None).unwrap();
        assert_eq!(sanitized.due_date.as_deref(), Some("2021-02-03"));
    }

    #[test]
    fn test_body_short_circuit_order() {
        let raw = TodoBody {
            status: "LATER".into(),
            due_date: "garbage".into(),
            ..TodoBody::default()
        };
        assert_eq!(message(validate_body(raw, None).unwrap_err()), INVALID_STATUS);

        let raw = TodoBody {
            due_date: "2021-02-29".into(),
            ..TodoBody::default()
        };
        assert_eq!(message(validate_body(raw, None).unwrap_err()), INVALID_DUE_DATE);
    }

    #[test]
    fn test_null_enum_fails_membership() {
        let raw = TodoBody {
            priority: BodyField::Null,
            status: "DONE".into(),
            ..TodoBody::default()
        };
        assert_eq!(message(validate_body(raw, None).unwrap_err()), INVALID_PRIORITY);

        let raw = TodoBody {
            category: BodyField::Null,
            ..TodoBody::default()
        };
        assert_eq!(message(validate_body(raw, None).unwrap_err()), INVALID_CATEGORY);

        assert!(STATUS_RULE.check(BodyField::Null).is_err());
        assert_eq!(STATUS_RULE.check(BodyField::Missing).unwrap(), None);
    }

    #[test]
    fn test_null_due_date_is_invalid() {
        let raw = TodoBody {
            due_date: BodyField::Null,
            ..TodoBody::default()
        };
        assert_eq!(message(validate_body(raw, None).unwrap_err()), INVALID_DUE_DATE);
    }

    #[test]
    fn test_null_todo_stays_present() {
        let raw = TodoBody {
            todo: BodyField::Null,
            id: BodyField::Null,
            ..TodoBody::default()
        };
        let sanitized = validate_body(raw, Some("1".to_string())).unwrap();
        assert_eq!(sanitized.todo, BodyField::Null);
        assert!(sanitized.id.is_none());
    }
}
