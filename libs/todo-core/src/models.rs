//! Data models for todo records and the request shapes that feed them

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Allowed values for `category`
pub const CATEGORIES: &[&str] = &["WORK", "HOME", "LEARNING"];

/// Allowed values for `priority`
pub const PRIORITIES: &[&str] = &["HIGH", "MEDIUM", "LOW"];

/// Allowed values for `status`
pub const STATUSES: &[&str] = &["TO DO", "IN PROGRESS", "DONE"];

/// A persisted todo record
///
/// Serialized with the wire keys `id, todo, priority, status, category, dueDate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Client-supplied identifier
    pub id: String,
    /// Free-text description
    pub todo: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub category: Option<String>,
    /// Canonical `YYYY-MM-DD` date
    pub due_date: Option<String>,
}

/// Raw query-string parameters accepted by the read endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoQuery {
    pub search_q: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub date: Option<String>,
}

/// One field of a JSON body: missing, explicitly `null`, or a string
///
/// `null` is present. It fails enumeration and date checks, and it
/// selects `todo` for an update like any other value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BodyField {
    #[default]
    Missing,
    Null,
    Value(String),
}

impl BodyField {
    /// True unless the key was left out of the body
    #[must_use]
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Missing)
    }

    /// The string value, if there is one
    #[must_use]
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            Self::Missing | Self::Null => None,
        }
    }

    /// `None` when missing, `Some(None)` when `null`
    #[must_use]
    pub fn as_present(&self) -> Option<Option<&str>> {
        self.is_present().then(|| self.as_deref())
    }

    #[must_use]
    pub fn into_value(self) -> Option<String> {
        match self {
            Self::Value(value) => Some(value),
            Self::Missing | Self::Null => None,
        }
    }
}

impl From<&str> for BodyField {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for BodyField {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<Option<String>> for BodyField {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Missing, Self::Value)
    }
}

impl<'de> Deserialize<'de> for BodyField {
    // Only called for keys that are present; missing keys take the default
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<String>::deserialize(deserializer)?.map_or(Self::Null, Self::Value))
    }
}

impl Serialize for BodyField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => serializer.serialize_str(value),
            Self::Missing | Self::Null => serializer.serialize_none(),
        }
    }
}

/// Raw JSON body accepted by the write endpoints
///
/// Unknown keys are ignored. `id` may be sent as a string or a number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TodoBody {
    #[serde(deserialize_with = "string_or_number")]
    pub id: BodyField,
    pub todo: BodyField,
    pub category: BodyField,
    pub priority: BodyField,
    pub status: BodyField,
    pub due_date: BodyField,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<BodyField, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<IdRepr>::deserialize(deserializer)? {
        Some(IdRepr::Text(text)) => BodyField::Value(text),
        Some(IdRepr::Number(number)) => BodyField::Value(number.to_string()),
        None => BodyField::Null,
    })
}

/// Validated read-path parameters for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedQuery {
    pub todo_id: Option<String>,
    pub search_q: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    /// Canonical date
    pub date: Option<String>,
}

/// Validated write-path fields for one request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SanitizedBody {
    pub todo_id: Option<String>,
    /// `None` when missing or `null`
    pub id: Option<String>,
    /// Kept three-state so an explicit `null` can be written
    pub todo: BodyField,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    /// Canonical date
    pub due_date: Option<String>,
}

/// A field that a PUT request is allowed to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdatableField {
    Priority,
    Todo,
    Status,
    Category,
    DueDate,
}

impl UpdatableField {
    /// Scan order used to pick the single field a PUT updates
    pub const SCAN_ORDER: [Self; 5] = [
        Self::Priority,
        Self::Todo,
        Self::Status,
        Self::Category,
        Self::DueDate,
    ];

    /// Column name in the `todo` table
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Priority => "priority",
            Self::Todo => "todo",
            Self::Status => "status",
            Self::Category => "category",
            Self::DueDate => "due_date",
        }
    }

    /// Confirmation text returned after a successful update
    #[must_use]
    pub fn confirmation(self) -> &'static str {
        match self {
            Self::Priority => "Priority Updated",
            Self::Todo => "Todo Updated",
            Self::Status => "Status Updated",
            Self::Category => "Category Updated",
            Self::DueDate => "Due Date Updated",
        }
    }

    /// The sanitized value for this field if the body carried it
    ///
    /// `Some(None)` is an explicit `null`, which only `todo` can hold after
    /// validation.
    #[must_use]
    pub fn value_in(self, body: &SanitizedBody) -> Option<Option<&str>> {
        match self {
            Self::Priority => body.priority.as_deref().map(Some),
            Self::Todo => body.todo.as_present(),
            Self::Status => body.status.as_deref().map(Some),
            Self::Category => body.category.as_deref().map(Some),
            Self::DueDate => body.due_date.as_deref().map(Some),
        }
    }
}
