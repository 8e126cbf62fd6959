use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::PoolError;
use shared::ErrorResponse;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PosError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("An ingredient with ID {0} already exists")]
    DuplicateIngredient(i32),

    #[error("Identifier allocation conflict: {0}")]
    AllocationConflict(String),

    #[error("Failed to add order: {0}")]
    OrderPersistence(DieselError),

    #[error("Database error: {0}")]
    Database(#[from] DieselError),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

pub type PosResult<T> = Result<T, PosError>;

impl PosError {
    pub fn validation(message: impl Into<String>) -> Self {
        PosError::Validation(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PosError::Validation(_) => StatusCode::BAD_REQUEST,
            PosError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PosError::NotFound(_) => StatusCode::NOT_FOUND,
            PosError::DuplicateIngredient(_) | PosError::AllocationConflict(_) => {
                StatusCode::CONFLICT
            }
            PosError::OrderPersistence(_)
            | PosError::Database(_)
            | PosError::Pool(_)
            | PosError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Reclassifies a store failure raised by an order transaction.
    pub fn into_order_failure(self) -> Self {
        match self {
            PosError::Database(e) => PosError::OrderPersistence(e),
            other => other,
        }
    }

    fn public_message(&self) -> String {
        match self {
            PosError::OrderPersistence(_) => "Failed to add order".to_string(),
            PosError::Database(_) | PosError::Pool(_) => "Internal server error".to_string(),
            PosError::Token(_) => "Failed to issue manager token".to_string(),
            other => other.to_string(),
        }
    }
}

/// Unique violations and serialization failures while handing out ids are conflicts the
/// client may retry; anything else stays a store failure.
pub fn classify_allocation_error(err: DieselError) -> PosError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
        | DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
            PosError::AllocationConflict(info.message().to_string())
        }
        other => PosError::Database(other),
    }
}

impl From<bb8::RunError<PoolError>> for PosError {
    fn from(err: bb8::RunError<PoolError>) -> Self {
        PosError::Pool(err.to_string())
    }
}

impl IntoResponse for PosError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "Request rejected");
        }

        (
            status,
            Json(ErrorResponse {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}
