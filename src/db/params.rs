//! Positional query arguments.
//!
//! [`QueryParam`] is the backend-neutral value type repositories bind into
//! queries; the `*_arguments` functions turn a slice of them into the
//! driver's argument buffer for the target backend.

use crate::error::{DbError, DbResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::Arguments;
use sqlx::mysql::MySqlArguments;
use sqlx::postgres::PgArguments;
use sqlx::sqlite::SqliteArguments;

/// A parameter value for parameterized queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryParam {
    /// NULL value
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value (stored as i64 for maximum range)
    Int(i64),
    /// Floating point value
    Float(f64),
    /// String value
    Text(String),
    /// UTC timestamp
    Timestamp(DateTime<Utc>),
}

impl QueryParam {
    /// Check if this parameter is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Get the type name of this parameter for debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Timestamp(_) => "timestamp",
        }
    }
}

impl From<&str> for QueryParam {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for QueryParam {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for QueryParam {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<bool> for QueryParam {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<DateTime<Utc>> for QueryParam {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Timestamp(v)
    }
}

impl<T: Into<QueryParam>> From<Option<T>> for QueryParam {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Self::Null)
    }
}

fn bind_error(param: &QueryParam, err: sqlx::error::BoxDynError) -> DbError {
    DbError::invalid_input(format!(
        "Failed to bind {} parameter: {}",
        param.type_name(),
        err
    ))
}

/// Build PostgreSQL arguments.
pub(crate) fn pg_arguments(params: &[QueryParam]) -> DbResult<PgArguments> {
    let mut args = PgArguments::default();
    for param in params {
        let bound = match param {
            QueryParam::Null => args.add(None::<String>),
            QueryParam::Bool(v) => args.add(*v),
            QueryParam::Int(v) => args.add(*v),
            QueryParam::Float(v) => args.add(*v),
            QueryParam::Text(v) => args.add(v.clone()),
            QueryParam::Timestamp(v) => args.add(*v),
        };
        bound.map_err(|e| bind_error(param, e))?;
    }
    Ok(args)
}

/// Build MySQL arguments.
pub(crate) fn mysql_arguments(params: &[QueryParam]) -> DbResult<MySqlArguments> {
    let mut args = MySqlArguments::default();
    for param in params {
        let bound = match param {
            QueryParam::Null => args.add(None::<String>),
            QueryParam::Bool(v) => args.add(*v),
            QueryParam::Int(v) => args.add(*v),
            QueryParam::Float(v) => args.add(*v),
            QueryParam::Text(v) => args.add(v.clone()),
            QueryParam::Timestamp(v) => args.add(*v),
        };
        bound.map_err(|e| bind_error(param, e))?;
    }
    Ok(args)
}

/// Build SQLite arguments.
pub(crate) fn sqlite_arguments(params: &[QueryParam]) -> DbResult<SqliteArguments<'static>> {
    let mut args = SqliteArguments::default();
    for param in params {
        let bound = match param {
            QueryParam::Null => args.add(None::<String>),
            QueryParam::Bool(v) => args.add(*v),
            QueryParam::Int(v) => args.add(*v),
            QueryParam::Float(v) => args.add(*v),
            QueryParam::Text(v) => args.add(v.clone()),
            QueryParam::Timestamp(v) => args.add(*v),
        };
        bound.map_err(|e| bind_error(param, e))?;
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_conversion() {
        assert_eq!(QueryParam::from(None::<String>), QueryParam::Null);
        assert_eq!(
            QueryParam::from(Some("acme")),
            QueryParam::Text("acme".to_string())
        );
    }

    #[test]
    fn test_type_names() {
        assert_eq!(QueryParam::Null.type_name(), "null");
        assert_eq!(QueryParam::from(3i64).type_name(), "int");
        assert_eq!(QueryParam::from(Utc::now()).type_name(), "timestamp");
        assert!(QueryParam::Null.is_null());
    }

    #[test]
    fn test_arguments_accept_every_variant() {
        let params = vec![
            QueryParam::Null,
            QueryParam::Bool(true),
            QueryParam::Int(7),
            QueryParam::Float(1.5),
            QueryParam::Text("x".to_string()),
            QueryParam::Timestamp(Utc::now()),
        ];
        assert_eq!(pg_arguments(&params).unwrap().len(), params.len());
        assert_eq!(mysql_arguments(&params).unwrap().len(), params.len());
        assert_eq!(sqlite_arguments(&params).unwrap().len(), params.len());
    }
}
