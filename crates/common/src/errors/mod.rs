//! Error types for the biobank registry
//!
//! Provides:
//! - Distinct error types for input, reference and database failures
//! - HTTP status code mapping
//! - An HTML error page for failures that cannot be turned into a flash
//! - The user-facing text shown in flash notifications

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::HtmlEscape;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    MissingField,
    InvalidFormat,

    // Resource errors (4xxx)
    MissingReference,

    // Database errors (7xxx)
    DatabaseError,
    ConnectionError,

    // Internal errors (9xxx)
    InternalError,
    ConfigurationError,
    TemplateError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationError => 1001,
            ErrorCode::MissingField => 1002,
            ErrorCode::InvalidFormat => 1003,

            ErrorCode::MissingReference => 4001,

            ErrorCode::DatabaseError => 7001,
            ErrorCode::ConnectionError => 7002,

            ErrorCode::InternalError => 9001,
            ErrorCode::ConfigurationError => 9002,
            ErrorCode::TemplateError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Input errors
    #[error("{message}")]
    Validation { message: String },

    #[error("Required field missing: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {message}")]
    InvalidFormat { field: String, message: String },

    /// An insert-time reference lookup matched no row
    #[error("Referenced record not found: {message}")]
    MissingReference { message: String },

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Database connection error: {message}")]
    DatabaseConnection { message: String },

    // Internal errors
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::MissingField { .. } => ErrorCode::MissingField,
            AppError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            AppError::MissingReference { .. } => ErrorCode::MissingReference,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::DatabaseConnection { .. } => ErrorCode::ConnectionError,
            AppError::Template(_) => ErrorCode::TemplateError,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Configuration { .. } => ErrorCode::ConfigurationError,
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            AppError::Validation { .. } |
            AppError::MissingField { .. } |
            AppError::InvalidFormat { .. } => StatusCode::BAD_REQUEST,

            // 422 Unprocessable Entity
            AppError::MissingReference { .. } => StatusCode::UNPROCESSABLE_ENTITY,

            // 500 Internal Server Error
            AppError::Database(_) |
            AppError::Template(_) |
            AppError::Internal { .. } |
            AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,

            // 503 Service Unavailable
            AppError::DatabaseConnection { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Check if this error should be logged at error level
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Check if this error is a client error
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Text shown to the user in a flash notification.
    ///
    /// Database failures carry the server's own message verbatim when the
    /// driver exposes one.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(err) => database_message(err).unwrap_or_else(|| err.to_string()),
            other => other.to_string(),
        }
    }

    /// Log at the level matching the error's severity
    pub fn log(&self, context: &str) {
        let code = self.code();
        if self.is_server_error() {
            tracing::error!(error = %self, code = ?code, context, "Server error");
        } else {
            tracing::warn!(error = %self, code = ?code, context, "Client error");
        }
    }
}

/// Extract the database server's message from a sea-orm error.
fn database_message(err: &sea_orm::DbErr) -> Option<String> {
    use sea_orm::{DbErr, RuntimeErr};

    let runtime = match err {
        DbErr::Exec(runtime) | DbErr::Query(runtime) | DbErr::Conn(runtime) => runtime,
        _ => return None,
    };

    match runtime {
        RuntimeErr::SqlxError(sqlx_err) => sqlx_err
            .as_database_error()
            .map(|db_err| db_err.message().to_string()),
        RuntimeErr::Internal(message) => Some(message.clone()),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

impl AppError {
    /// Fallback page for failures that cannot be shown as a flash notification
    pub fn error_page(&self) -> String {
        format!(
            "<!doctype html><html><head><meta charset=\"utf-8\"><title>Error {code}</title></head>\
             <body><h1>{status}</h1><p>{message}</p><p><a href=\"/\">Back to home</a></p></body></html>",
            code = self.code().as_code(),
            status = self.status_code(),
            message = HtmlEscape(&self.user_message()),
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log("page");
        (self.status_code(), Html(self.error_page())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::MissingReference { message: "disease 99".into() };
        assert_eq!(err.code(), ErrorCode::MissingReference);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.is_client_error());
    }

    #[test]
    fn test_validation_error() {
        let err = AppError::Validation {
            message: "name: must not be empty".into(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(!err.is_server_error());
        assert_eq!(err.user_message(), "name: must not be empty");
    }

    #[test]
    fn test_database_error_is_server_error() {
        let err = AppError::Database(sea_orm::DbErr::Custom("boom".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.is_server_error());
        assert!(err.user_message().contains("boom"));
    }

    #[test]
    fn test_internal_runtime_message_is_verbatim() {
        let err = AppError::Database(sea_orm::DbErr::Exec(sea_orm::RuntimeErr::Internal(
            "duplicate key value violates unique constraint \"donors_pkey\"".into(),
        )));
        assert_eq!(
            err.user_message(),
            "duplicate key value violates unique constraint \"donors_pkey\""
        );
    }

    #[test]
    fn test_error_page_escapes_message() {
        let err = AppError::MissingReference { message: "<script>alert(1)</script> & co".into() };
        let page = err.error_page();
        assert!(page.contains("&lt;script&gt;alert(1)"));
        assert!(page.contains("&amp; co"));
        assert!(!page.contains("<script>"));
        assert!(page.contains("<title>Error 4001</title>"));
    }
}
