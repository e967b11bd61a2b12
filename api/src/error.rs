use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::json::Pretty;

/// Why a message submission was refused. The display text is what the
/// caller sees.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Invalid request body.")]
    InvalidBody,
    #[error("Invalid user ID")]
    InvalidUserId,
    #[error("All fields are required.")]
    MissingFields,
    #[error("Full name is required.")]
    EmptyName,
    #[error("Name cannot contain numbers.")]
    NameHasDigits,
    #[error("Please enter both first name and surname.")]
    NameNeedsSurname,
    #[error("Full name cannot exceed 50 characters.")]
    NameTooLong,
    #[error("Each part of the name must be 25 characters or less.")]
    NamePartTooLong,
    #[error("Invalid email address.")]
    InvalidEmail,
    #[error("This email address does not appear to be deliverable.")]
    Undeliverable,
    #[error("Message cannot be empty.")]
    EmptyMessage,
    #[error("Message cannot exceed 300 characters.")]
    MessageTooLong,
    #[error("User ID not found or inbox structure not present")]
    RecipientNotFound,
    #[error("Error sending a new message to user.")]
    Store(#[from] sqlx::Error),
    #[error("Error sending a new message to user.")]
    InboxNotUpdated,
}

impl SubmitError {
    pub fn status(&self) -> StatusCode {
        match self {
            SubmitError::RecipientNotFound => StatusCode::NOT_FOUND,
            SubmitError::Store(_) | SubmitError::InboxNotUpdated => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for SubmitError {
    fn into_response(self) -> Response {
        if let SubmitError::Store(e) = &self {
            tracing::error!("Error sending a new message to user: {e}");
        }
        (self.status(), Pretty(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Errors of the read-only portfolio endpoints.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{context}")]
    Store {
        context: String,
        #[source]
        source: sqlx::Error,
    },
}

impl ApiError {
    pub fn store(context: impl Into<String>, source: sqlx::Error) -> Self {
        ApiError::Store {
            context: context.into(),
            source,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Store { context, source } => {
                tracing::error!("{context}: {source}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (
            status,
            Pretty(json!({ "success": false, "message": self.to_string() })),
        )
            .into_response()
    }
}
