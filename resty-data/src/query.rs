//! Statements issued by a store-backed resource, in SQLite syntax.
//!
//! Identifiers must be plain names (`[A-Za-z_][A-Za-z0-9_]*`) and are
//! double-quoted. Values are never interpolated; they come back as `?` bind
//! parameters in placeholder order.
//!
//! ```ignore
//! let (sql, params) = QueryBuilder::new("animals")
//!     .where_eq("legs", 4)
//!     .order_by("id", true)
//!     .select()?;
//! // SELECT * FROM "animals" WHERE "legs" = ? ORDER BY "id" ASC
//! ```

use serde_json::Value;

use crate::record::Record;

pub type Statement = (String, Vec<Value>);

#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table: String,
    filters: Vec<(String, Value)>,
    order: Vec<(String, bool)>,
    returning_row: bool,
}

impl QueryBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            returning_row: false,
        }
    }

    /// Exact-match filter, ANDed with the others. `null` matches `IS NULL`.
    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push((column.to_string(), ascending));
        self
    }

    /// Have INSERT, UPDATE and DELETE return the written row (`RETURNING *`).
    pub fn returning_row(mut self) -> Self {
        self.returning_row = true;
        self
    }

    pub fn select(&self) -> Result<Statement, QueryError> {
        let mut sql = format!("SELECT * FROM {}", ident(&self.table, "table")?);
        let mut params = Vec::new();
        self.push_where(&mut sql, &mut params)?;
        for (idx, (column, ascending)) in self.order.iter().enumerate() {
            sql.push_str(if idx == 0 { " ORDER BY " } else { ", " });
            sql.push_str(&ident(column, "column")?);
            sql.push_str(if *ascending { " ASC" } else { " DESC" });
        }
        Ok((sql, params))
    }

    /// INSERT one row. An empty record inserts `DEFAULT VALUES`.
    pub fn insert(&self, record: &Record) -> Result<Statement, QueryError> {
        let table = ident(&self.table, "table")?;
        let mut sql = if record.is_empty() {
            format!("INSERT INTO {table} DEFAULT VALUES")
        } else {
            let columns = record
                .columns()
                .map(|c| ident(c, "column"))
                .collect::<Result<Vec<_>, _>>()?;
            let slots = vec!["?"; columns.len()];
            format!("INSERT INTO {table} ({}) VALUES ({})", columns.join(", "), slots.join(", "))
        };
        self.push_returning(&mut sql);
        Ok((sql, record.iter().map(|(_, v)| v.clone()).collect()))
    }

    /// UPDATE the filtered rows with every value of `record`. The assigned
    /// values bind before the filter values.
    pub fn update(&self, record: &Record) -> Result<Statement, QueryError> {
        if record.is_empty() {
            return Err(QueryError::EmptyAssignment);
        }
        let mut params = Vec::with_capacity(record.len() + self.filters.len());
        let mut assignments = Vec::with_capacity(record.len());
        for (column, value) in record.iter() {
            assignments.push(format!("{} = ?", ident(column, "column")?));
            params.push(value.clone());
        }
        let mut sql = format!(
            "UPDATE {} SET {}",
            ident(&self.table, "table")?,
            assignments.join(", ")
        );
        self.push_where(&mut sql, &mut params)?;
        self.push_returning(&mut sql);
        Ok((sql, params))
    }

    pub fn delete(&self) -> Result<Statement, QueryError> {
        let mut sql = format!("DELETE FROM {}", ident(&self.table, "table")?);
        let mut params = Vec::new();
        self.push_where(&mut sql, &mut params)?;
        self.push_returning(&mut sql);
        Ok((sql, params))
    }

    fn push_where(&self, sql: &mut String, params: &mut Vec<Value>) -> Result<(), QueryError> {
        for (idx, (column, value)) in self.filters.iter().enumerate() {
            sql.push_str(if idx == 0 { " WHERE " } else { " AND " });
            sql.push_str(&ident(column, "column")?);
            if value.is_null() {
                sql.push_str(" IS NULL");
            } else {
                sql.push_str(" = ?");
                params.push(value.clone());
            }
        }
        Ok(())
    }

    fn push_returning(&self, sql: &mut String) {
        if self.returning_row {
            sql.push_str(" RETURNING *");
        }
    }
}

/// Quote `name` after checking it is a plain identifier.
fn ident(name: &str, kind: &'static str) -> Result<String, QueryError> {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain {
        Ok(format!("\"{name}\""))
    } else {
        Err(QueryError::InvalidIdentifier {
            kind,
            ident: name.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub enum QueryError {
    InvalidIdentifier { kind: &'static str, ident: String },
    EmptyAssignment,
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryError::InvalidIdentifier { kind, ident } => {
                write!(f, "Invalid {kind} identifier: {ident}")
            }
            QueryError::EmptyAssignment => write!(f, "UPDATE without any column to assign"),
        }
    }
}

impl std::error::Error for QueryError {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => Record::from(map),
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn select_whole_table() {
        let (sql, params) = QueryBuilder::new("animals").select().unwrap();
        assert_eq!(sql, r#"SELECT * FROM "animals""#);
        assert!(params.is_empty());
    }

    #[test]
    fn filters_are_anded_and_ordered() {
        let (sql, params) = QueryBuilder::new("animals")
            .where_eq("legs", "4")
            .where_eq("name", Value::Null)
            .where_eq("id", 2)
            .order_by("id", true)
            .select()
            .unwrap();
        assert_eq!(
            sql,
            r#"SELECT * FROM "animals" WHERE "legs" = ? AND "name" IS NULL AND "id" = ? ORDER BY "id" ASC"#
        );
        assert_eq!(params, vec![json!("4"), json!(2)]);
    }

    #[test]
    fn insert_returns_the_row() {
        let (sql, params) = QueryBuilder::new("animals")
            .returning_row()
            .insert(&record(json!({"legs": 8, "name": "spider"})))
            .unwrap();
        assert_eq!(
            sql,
            r#"INSERT INTO "animals" ("legs", "name") VALUES (?, ?) RETURNING *"#
        );
        assert_eq!(params, vec![json!(8), json!("spider")]);
    }

    #[test]
    fn empty_insert_uses_defaults() {
        let (sql, params) = QueryBuilder::new("animals").insert(&Record::new()).unwrap();
        assert_eq!(sql, r#"INSERT INTO "animals" DEFAULT VALUES"#);
        assert!(params.is_empty());
    }

    #[test]
    fn update_binds_assignments_before_key() {
        let (sql, params) = QueryBuilder::new("tags")
            .where_eq("yet_another_id", "7")
            .returning_row()
            .update(&record(json!({"label": "x"})))
            .unwrap();
        assert_eq!(
            sql,
            r#"UPDATE "tags" SET "label" = ? WHERE "yet_another_id" = ? RETURNING *"#
        );
        assert_eq!(params, vec![json!("x"), json!("7")]);
    }

    #[test]
    fn update_needs_an_assignment() {
        let err = QueryBuilder::new("animals")
            .where_eq("id", 1)
            .update(&Record::new())
            .unwrap_err();
        assert!(matches!(err, QueryError::EmptyAssignment));
    }

    #[test]
    fn delete_by_key() {
        let (sql, params) = QueryBuilder::new("animals").where_eq("id", 1).delete().unwrap();
        assert_eq!(sql, r#"DELETE FROM "animals" WHERE "id" = ?"#);
        assert_eq!(params, vec![json!(1)]);
    }

    #[test]
    fn rejects_non_plain_identifiers() {
        let err = QueryBuilder::new("animals;drop").select().unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier { kind: "table", .. }));

        let err = QueryBuilder::new("animals")
            .where_eq("legs = 1 OR 1", 1)
            .delete()
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidIdentifier { kind: "column", .. }));

        assert!(QueryBuilder::new("zoo.animals").select().is_err());
        assert!(QueryBuilder::new("").select().is_err());
    }
}
