use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;

use crate::error::{BookingError, CatalogError, StoreError};

/// Error half of the response envelope:
/// `{ "success": false, "error": kind, "message": text, "seats"?: [...] }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
    pub seats: Option<Vec<String>>,
}

impl ApiError {
    pub fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
            seats: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Valid credentials are required",
        )
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    fn with_seats(mut self, seats: Vec<String>) -> Self {
        self.seats = Some(seats);
        self
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
        )
    }

    // Storage details stay in the log
    fn storage(err: &StoreError) -> Self {
        tracing::error!("storage failure: {:?}", err);
        Self::internal()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.kind,
            "message": self.message,
        });
        if let Some(seats) = self.seats {
            body["seats"] = json!(seats);
        }
        (self.status, Json(body)).into_response()
    }
}

impl From<BookingError> for ApiError {
    fn from(err: BookingError) -> Self {
        let message = err.to_string();
        match err {
            BookingError::EmptySelection => ApiError::bad_request(message),
            BookingError::NotFound { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, "not_found", message)
            }
            BookingError::InvalidSeat(seats) => {
                ApiError::new(StatusCode::BAD_REQUEST, "invalid_seat", message).with_seats(seats)
            }
            BookingError::SeatUnavailable(seats) => {
                ApiError::new(StatusCode::CONFLICT, "seat_unavailable", message).with_seats(seats)
            }
            BookingError::ConcurrencyConflict => {
                ApiError::new(StatusCode::CONFLICT, "concurrency_conflict", message)
            }
            BookingError::AlreadyCancelled(_) => {
                ApiError::new(StatusCode::CONFLICT, "already_cancelled", message)
            }
            BookingError::Forbidden => ApiError::new(StatusCode::FORBIDDEN, "forbidden", message),
            BookingError::Store(e) => ApiError::storage(&e),
        }
    }
}

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::NotFound { .. } => {
                ApiError::new(StatusCode::NOT_FOUND, "not_found", message)
            }
            CatalogError::SeatMap(_) | CatalogError::Invalid(_) => ApiError::bad_request(message),
            CatalogError::Store(e) => ApiError::storage(&e),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort_unstable();
        ApiError::bad_request(format!("invalid fields: {}", fields.join(", ")))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => ApiError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_media_type",
                rejection.body_text(),
            ),
            _ => ApiError::new(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text()),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::new(StatusCode::BAD_REQUEST, "invalid_path", rejection.body_text())
    }
}

/// Success half of the envelope.
pub fn ok<T: Serialize>(data: T) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "data": data }))
}
