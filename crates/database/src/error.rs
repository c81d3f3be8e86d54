use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load configuration for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Failed to connect to the database: {0}")]
    Connection(#[source] sqlx::Error),

    /// The statement failed to execute. The driver's message is surfaced unchanged.
    #[error("{0}")]
    Query(#[source] sqlx::Error),

    #[error("A record with the same unique value already exists: {0}")]
    Conflict(#[source] sqlx::Error),

    #[error("A referenced record does not exist: {0}")]
    ForeignKey(#[source] sqlx::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(#[from] CoreError),

    #[error("The requested data was not found in the database.")]
    NotFound,
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        let (unique, foreign_key) = match &err {
            sqlx::Error::Database(db_err) => {
                (db_err.is_unique_violation(), db_err.is_foreign_key_violation())
            }
            _ => (false, false),
        };

        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            err if unique => DbError::Conflict(err),
            err if foreign_key => DbError::ForeignKey(err),
            err => DbError::Query(err),
        }
    }
}
