//! Classification of persistence failures.
//!
//! Repositories return `anyhow` errors. Services call [`DbFailure::classify`]
//! once at their boundary, which maps the underlying [`DbErr`] onto the
//! small set of outcomes the HTTP layer distinguishes.

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DbFailure {
    /// Unique constraint violated.
    #[error("This record already exists")]
    Conflict(String),

    /// Foreign key or data representation problem caused by the input.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The datastore could not be reached or no connection was available.
    #[error("Database unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Other(String),
}

impl DbFailure {
    #[must_use]
    pub fn classify(err: &anyhow::Error) -> Self {
        err.chain()
            .find_map(|cause| cause.downcast_ref::<DbErr>())
            .map_or_else(|| Self::Other(format!("{err:#}")), Self::from_db_err)
    }

    #[must_use]
    pub fn from_db_err(err: &DbErr) -> Self {
        let detail = err.to_string();

        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => return Self::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => return Self::InvalidData(msg),
            _ => {}
        }

        match err {
            DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => Self::Unavailable(detail),
            DbErr::Type(_) | DbErr::Json(_) | DbErr::TryIntoErr { .. } => {
                Self::InvalidData(detail)
            }
            DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e))
                if is_connection_error(e) =>
            {
                Self::Unavailable(detail)
            }
            _ => Self::Other(detail),
        }
    }

    /// Internal detail suitable for logs and development-mode envelopes.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Conflict(d) | Self::InvalidData(d) | Self::Unavailable(d) | Self::Other(d) => d,
        }
    }
}

fn is_connection_error(err: &sea_orm::sqlx::Error) -> bool {
    use sea_orm::sqlx::Error;

    match err {
        Error::Io(_) | Error::Tls(_) | Error::PoolTimedOut | Error::PoolClosed => true,
        // SQLSTATE class 08: connection exception
        Error::Database(db) => db.code().is_some_and(|code| code.starts_with("08")),
        _ => false,
    }
}
