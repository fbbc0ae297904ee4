//! Database module - validation, statement building and store access

mod core;
pub mod date_utils;
pub mod mappers;
pub mod query_builders;
pub mod validators;

pub use self::core::*;

pub use date_utils::{format_canonical, normalize_date, parse_date, DateParseError};
pub use query_builders::{SingleFieldUpdate, Statement, TodoFilterBuilder, TodoInsert};
pub use validators::{validate_body, validate_query};
