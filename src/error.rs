//! 공통 에러 타입
//!
//! 읽기 실패와 쓰기 실패 모두 에러로 전파합니다. 조용히 빈 결과나
//! false를 돌려주지 않습니다.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// tablekit 공통 에러
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid identifier: {name}")]
    InvalidIdentifier { name: String },

    #[error("missing data for {operation}")]
    MissingData { operation: &'static str },

    #[error("empty conditions for {operation}")]
    EmptyConditions { operation: &'static str },

    #[error("connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("constraint violation: {message}")]
    Constraint { message: String },

    #[error("syntax error: {message}")]
    Syntax { message: String },

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => Error::Constraint {
                    message: db.message().to_string(),
                },
                _ => Error::Syntax {
                    message: db.message().to_string(),
                },
            },
            e @ (sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::Configuration(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed) => Error::Connection(e),
            e => Error::Database(e),
        }
    }
}
