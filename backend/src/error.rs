use axum::{http::StatusCode, Json};
use shared::ApiError;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum TripApiError {
    #[error("Invalid trip ID")]
    InvalidTripId(String),
    #[error("Invalid user ID")]
    InvalidUserId(String),
    #[error("Trip not found")]
    TripNotFound(i64),
    #[error("Profile not found")]
    ProfileNotFound(i64),
    #[error("Error fetching trip")]
    Store(#[from] StoreError),
}

impl TripApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidTripId(_) | Self::InvalidUserId(_) => StatusCode::BAD_REQUEST,
            Self::TripNotFound(_) | Self::ProfileNotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(StoreError::Database(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts an API failure into the JSON error response.
pub fn api_error(err: TripApiError) -> (StatusCode, Json<ApiError>) {
    let status = err.status();
    if let TripApiError::Store(source) = &err {
        tracing::error!(error = %source, %status, "trip request failed");
    } else {
        tracing::debug!(error = %err, %status, "trip request rejected");
    }

    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}
