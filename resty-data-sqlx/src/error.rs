use resty_core::HttpError;
use resty_data::DataError;

/// Extension trait for converting `sqlx::Error` into `DataError`.
///
/// Due to Rust's orphan rules, we can't implement `From<sqlx::Error> for DataError`
/// in this crate. Instead, use `.into_data_error()` or the `?` operator with `SqlxResult`.
pub trait SqlxErrorExt {
    fn into_data_error(self) -> DataError;
}

impl SqlxErrorExt for sqlx::Error {
    fn into_data_error(self) -> DataError {
        match &self {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".into()),
            _ => DataError::database(self),
        }
    }
}

/// Convenience alias for data-layer results using `DataError`.
pub type SqlxResult<T> = Result<T, DataError>;

/// A storage failure inside a mutation, surfaced to the client as 400 with
/// the driver's message.
pub(crate) fn rejected(err: DataError) -> HttpError {
    match err {
        DataError::Database(e) => HttpError::BadRequest(e.to_string()),
        other => HttpError::BadRequest(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_not_found() {
        let err = sqlx::Error::RowNotFound.into_data_error();
        assert!(matches!(err, DataError::NotFound(_)));
    }

    #[test]
    fn other_errors_are_database_errors() {
        let err = sqlx::Error::PoolTimedOut.into_data_error();
        assert!(matches!(err, DataError::Database(_)));
    }

    #[test]
    fn rejected_keeps_driver_message() {
        let err = rejected(sqlx::Error::PoolTimedOut.into_data_error());
        match err {
            HttpError::BadRequest(msg) => assert_eq!(msg, sqlx::Error::PoolTimedOut.to_string()),
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }
}
