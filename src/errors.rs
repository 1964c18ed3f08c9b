use crate::db::errors::DbError;
use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error as ThisError;

/// Realm hint sent with authentication challenges
pub const BASIC_REALM: &str = "Guestbook";

#[derive(ThisError, Debug)]
pub enum Error {
    /// Operator credential required but absent or wrong
    #[error("Not authenticated")]
    Unauthenticated,

    /// Caller-supplied data fails a validation rule
    #[error("{message}")]
    BadRequest { message: String },

    /// Submission payload exceeds a configured byte ceiling
    #[error("{message}")]
    PayloadTooLarge { message: String },

    /// Requested resource not found. Deliberately carries no detail: "bad id
    /// format" and "no such row" must be indistinguishable to the caller.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Generic internal service error
    #[error("Failed to {operation}")]
    Internal { operation: String },

    /// Database operation error
    #[error(transparent)]
    Database(#[from] DbError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Database(db_err) => match db_err {
                DbError::NotFound => StatusCode::NOT_FOUND,
                DbError::CheckViolation { .. } => StatusCode::BAD_REQUEST,
                DbError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking internal implementation details
    pub fn user_message(&self) -> String {
        match self {
            Error::Unauthenticated => "unauthorized".to_string(),
            Error::BadRequest { message } => message.clone(),
            Error::PayloadTooLarge { message } => message.clone(),
            Error::NotFound { resource } => format!("{resource} not found"),
            Error::Internal { .. } => "internal server error".to_string(),
            Error::Database(db_err) => match db_err {
                DbError::NotFound => "not found".to_string(),
                DbError::CheckViolation { .. } => "invalid data provided".to_string(),
                DbError::Other(_) => "internal server error".to_string(),
            },
            Error::Other(_) => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging - different log levels based on severity.
        // Only the user_message leaves the process.
        match &self {
            Error::Database(DbError::Other(_)) | Error::Internal { .. } | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::Database(_) => {
                tracing::warn!("Database constraint error: {}", self);
            }
            Error::Unauthenticated => {
                tracing::info!("Authentication failure");
            }
            Error::BadRequest { .. } | Error::PayloadTooLarge { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let user_message = self.user_message();

        if matches!(self, Error::Unauthenticated) {
            let challenge = format!("Basic realm=\"{BASIC_REALM}\"");
            return (status, [(header::WWW_AUTHENTICATE, challenge)], user_message).into_response();
        }

        (status, user_message).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;
