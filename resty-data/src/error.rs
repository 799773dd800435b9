use resty_core::HttpError;

use crate::query::QueryError;

/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    NotFound(String),
    Database(Box<dyn std::error::Error + Send + Sync>),
    Query(QueryError),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates (e.g. `resty-data-sqlx`) to wrap driver-specific
    /// errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Database(err) => write!(f, "Database error: {err}"),
            DataError::Query(err) => write!(f, "Query error: {err}"),
            DataError::Other(msg) => write!(f, "Data error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            DataError::Query(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QueryError> for DataError {
    fn from(err: QueryError) -> Self {
        DataError::Query(err)
    }
}

impl From<DataError> for HttpError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(msg) => HttpError::NotFound(msg),
            DataError::Database(e) => HttpError::Internal(e.to_string()),
            DataError::Query(e) => HttpError::Internal(e.to_string()),
            DataError::Other(msg) => HttpError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let err: HttpError = DataError::NotFound("animal 3".into()).into();
        assert!(matches!(err, HttpError::NotFound(msg) if msg == "animal 3"));
    }

    #[test]
    fn query_error_is_internal() {
        let err: HttpError = DataError::from(QueryError::InvalidIdentifier {
            kind: "table",
            ident: "a;b".into(),
        })
        .into();
        assert!(matches!(err, HttpError::Internal(msg) if msg == "Invalid table identifier: a;b"));
    }

    #[test]
    fn database_source_is_kept() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = DataError::database(io);
        assert_eq!(err.to_string(), "Database error: disk full");
        assert!(std::error::Error::source(&err).is_some());
    }
}
