use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use sqlx::mysql::MySqlDatabaseError;
use thiserror::Error;

/// Failures of the session service.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Email atau kata sandi tidak valid")]
    InvalidCredentials,

    #[error("Missing Authorization header")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Wrong token type")]
    WrongTokenType,

    #[error("Session has been revoked")]
    Revoked,

    #[error("Credential crypto failed: {0}")]
    Crypto(String),
}

/// Failures of the remote tables.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unreachable: {0}")]
    Connectivity(String),

    #[error("Constraint violation: {0}")]
    Conflict(String),

    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Query failed: {0}")]
    Query(String),
}

/// MySQL `ER_DUP_ENTRY`. Foreign-key and CHECK failures share SQLSTATE 23000
/// but are not conflicts.
const ER_DUP_ENTRY: u16 = 1062;

impl StoreError {
    fn from_mysql(number: Option<u16>, message: &str) -> Self {
        match number {
            Some(ER_DUP_ENTRY) => StoreError::Conflict(message.to_string()),
            _ => StoreError::Query(message.to_string()),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => StoreError::NotFound { entity: "Row" },
            sqlx::Error::Database(db_err) => {
                let number = db_err
                    .try_downcast_ref::<MySqlDatabaseError>()
                    .map(MySqlDatabaseError::number);
                StoreError::from_mysql(number, db_err.message())
            }
            sqlx::Error::Io(e) => StoreError::Connectivity(e.to_string()),
            other @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed) => {
                StoreError::Connectivity(other.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Rejected user actions.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Already checked in today")]
    AlreadyCheckedIn,

    #[error("Already checked out today")]
    AlreadyCheckedOut,

    #[error("No active check-in found for today")]
    NotCheckedIn,

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: &'static str },

    #[error("No fields provided for update")]
    EmptyUpdate,
}

/// Error returned from every handler; rendered as `{"error": ...}`.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthError::Crypto(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Validation(
                ValidationError::AlreadyCheckedIn
                | ValidationError::AlreadyCheckedOut
                | ValidationError::NotCheckedIn,
            ) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let body = match self {
            AppError::Auth(AuthError::Crypto(_)) => json!({ "error": "Internal Server Error" }),
            // unauthenticated clients are sent back to the login page
            AppError::Auth(e) => json!({ "error": e.to_string(), "redirect": "/login" }),
            AppError::Store(StoreError::NotFound { .. }) | AppError::Validation(_) => {
                json!({ "error": self.to_string() })
            }
            AppError::Store(_) => json!({ "error": "Internal Server Error" }),
        };
        HttpResponse::build(status).json(body)
    }
}
