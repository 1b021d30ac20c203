use std::fmt;

use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use derive_more::Display;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use serde::Serialize;
use serde_json::{Map, Value};
use validator::ValidationErrors;

/// Application-level failures. Every variant funnels through one JSON
/// envelope: `{ "message": string, "errors"?: { field: message } }`.
#[derive(Debug)]
pub enum AppError {
    /// One or more field rules failed.
    Validation(Vec<FieldError>),
    /// Malformed resource id (not a UUID).
    InvalidId(String),
    /// A write operation arrived without its required file.
    MissingFile(String),
    NotFound(String),
    /// Storage or media provider failure. Detail is logged, never returned.
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => {
                let messages = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Validation failed: {}", messages)
            }
            AppError::InvalidId(msg) => write!(f, "{}", msg),
            AppError::MissingFile(msg) => write!(f, "{}", msg),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AppError::Validation(errors) => {
                let mut fields = Map::new();
                for e in errors {
                    fields
                        .entry(e.field.clone())
                        .or_insert_with(|| Value::String(e.message.clone()));
                }
                serde_json::json!({
                    "message": "Validation failed",
                    "errors": fields
                })
            }
            AppError::Internal(detail) => {
                tracing::error!("internal error: {}", detail);
                serde_json::json!({ "message": "Internal server error" })
            }
            _ => serde_json::json!({ "message": self.to_string() }),
        };

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::MissingFile(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl AppError {
    pub fn validation(field: &str, message: &str) -> Self {
        AppError::Validation(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let field_errors = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(|e| FieldError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "Invalid value".to_string()),
                })
            })
            .collect();

        AppError::Validation(field_errors)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => AppError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Internal(format!("Media provider error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

#[derive(Debug, Display)]
pub enum AuthError {
    /// Covers both "no such user" and "wrong password" so the response
    /// never reveals which one happened.
    #[display("Invalid credentials")]
    WrongCredentials,

    #[display("Invalid token")]
    InvalidToken,

    #[display("Token has expired")]
    TokenExpired,

    #[display("Missing credentials")]
    MissingCredentials,

    #[display("Token creation error")]
    TokenCreation,

    #[display("Missing JWT service")]
    MissingJwtService,

    #[display("Validation failed")]
    InvalidLoginPayload(Vec<FieldError>),
}

impl ResponseError for AuthError {
    fn error_response(&self) -> HttpResponse {
        let body = match self {
            AuthError::InvalidLoginPayload(errors) => {
                let mut fields = Map::new();
                for e in errors {
                    fields
                        .entry(e.field.clone())
                        .or_insert_with(|| Value::String(e.message.clone()));
                }
                serde_json::json!({
                    "message": "Validation failed",
                    "errors": fields
                })
            }
            _ => serde_json::json!({ "message": self.to_string() }),
        };

        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::WrongCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::MissingCredentials => StatusCode::UNAUTHORIZED,
            AuthError::TokenCreation => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::MissingJwtService => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::InvalidLoginPayload(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<JwtError> for AuthError {
    fn from(e: JwtError) -> Self {
        match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::InvalidToken,
        }
    }
}

impl From<ValidationErrors> for AuthError {
    fn from(errors: ValidationErrors) -> Self {
        match AppError::from(errors) {
            AppError::Validation(fields) => AuthError::InvalidLoginPayload(fields),
            _ => AuthError::MissingCredentials,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}
