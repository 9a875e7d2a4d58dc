// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! API error type and HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::funding::FundingError;

/// An error returned to API clients as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("API error: {}", self);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<FundingError> for ApiError {
    fn from(e: FundingError) -> Self {
        let status = match &e {
            FundingError::WalletNotFound(_) | FundingError::TransactionNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            FundingError::Unauthorized => StatusCode::FORBIDDEN,
            FundingError::AmountOutOfRange { .. } | FundingError::LimitExceeded { .. } => {
                StatusCode::BAD_REQUEST
            }
            FundingError::Network(_) => StatusCode::SERVICE_UNAVAILABLE,
            FundingError::FundingFailed(_) => StatusCode::BAD_GATEWAY,
            FundingError::CredentialsMissing(_) | FundingError::Crypto(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            FundingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}
