//! Error type for the model layer

use thiserror::Error;

/// Everything a [`Model`](super::Model) operation can fail with.
///
/// `ColumnNotFound`, `OperatorMissing` and `MissingPrimaryKey` are programming
/// defects in the caller and are never worth retrying. `Store` carries the storage
/// engine's error unchanged.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("column `{column}` does not exist on `{table}`")]
    ColumnNotFound { table: &'static str, column: String },

    #[error("filter on `{column}` has no operator")]
    OperatorMissing { column: String },

    #[error("upsert into `{table}` requires a primary key value")]
    MissingPrimaryKey { table: &'static str },

    #[error("no `{table}` row with id `{id}`")]
    NotFound { table: &'static str, id: String },

    #[error("transaction has already been committed or rolled back")]
    TransactionClosed,

    #[error(transparent)]
    Store(#[from] sqlx::Error),
}

impl ModelError {
    /// True for errors caused by a malformed query description
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ModelError::ColumnNotFound { .. }
                | ModelError::OperatorMissing { .. }
                | ModelError::MissingPrimaryKey { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ModelError::NotFound { .. })
    }
}

pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let missing = ModelError::ColumnNotFound {
            table: "posts",
            column: "nope".to_string(),
        };
        assert!(missing.is_configuration());
        assert!(!missing.is_not_found());
        assert_eq!(missing.to_string(), "column `nope` does not exist on `posts`");

        let not_found = ModelError::NotFound {
            table: "posts",
            id: "abc".to_string(),
        };
        assert!(not_found.is_not_found());
        assert!(!not_found.is_configuration());

        let store = ModelError::from(sqlx::Error::RowNotFound);
        assert!(!store.is_configuration());
    }
}
