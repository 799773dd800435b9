//! Binding JSON values as SQLite parameters.

use serde_json::Value;
use sqlx::query::{Query, QueryAs};
use sqlx::sqlite::{Sqlite, SqliteArguments};

// Arrays and objects are stored as their JSON text.
macro_rules! bind_json {
    ($query:expr, $value:expr) => {
        match $value {
            Value::Null => $query.bind(None::<String>),
            Value::Bool(b) => $query.bind(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => $query.bind(i),
                None => $query.bind(n.as_f64()),
            },
            Value::String(s) => $query.bind(s),
            other => $query.bind(other.to_string()),
        }
    };
}

pub(crate) fn bind_all<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: Vec<Value>,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for value in params {
        query = bind_json!(query, value);
    }
    query
}

pub(crate) fn bind_all_as<'q, E>(
    mut query: QueryAs<'q, Sqlite, E, SqliteArguments<'q>>,
    params: Vec<Value>,
) -> QueryAs<'q, Sqlite, E, SqliteArguments<'q>> {
    for value in params {
        query = bind_json!(query, value);
    }
    query
}
