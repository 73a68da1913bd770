// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization errors.
//!
//! Every stage of the gate fails with an [`AuthError`]. Each variant maps to
//! a machine-readable code, an HTTP status and a fixed human description,
//! and renders as the service-wide failure envelope:
//!
//! ```json
//! { "success": false, "error": 401, "message": "invalid_header: Authorization header missing" }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ErrorEnvelope;

/// Authorization error type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No (or an empty) authorization header
    #[error("Authorization header missing")]
    MissingAuthHeader,
    /// Header does not open with the `Bearer` scheme
    #[error("\"Bearer\" missing from Authorization header")]
    MissingBearer,
    /// `Bearer` with nothing after it
    #[error("Token missing from Authorization header")]
    MissingToken,
    /// More than scheme and token, or not valid header text
    #[error("Authorization header must be \"bearer token\"")]
    MalformedAuthHeader,
    /// Token header carries no `kid`
    #[error("Authorization malformed")]
    MissingKeyId,
    /// Token declares an algorithm other than the trusted one
    #[error("Unable to verify token header")]
    UntrustedAlgorithm,
    /// Signing keys could not be retrieved from the identity provider
    #[error("Unable to fetch signing keys")]
    KeySetUnavailable(String),
    /// No key with the token's `kid`, even after a refresh
    #[error("Unable to find appropriate key")]
    NoMatchingKey,
    /// Token structure or payload could not be decoded
    #[error("Unable to decode token")]
    UndecodableToken,
    /// Signature does not verify against the resolved key
    #[error("Unable to verify token header")]
    InvalidSignature,
    /// `exp` is at or before the current time
    #[error("Token expired")]
    TokenExpired,
    /// Audience or issuer mismatch
    #[error("Incorrect claims, check audience and issuer")]
    InvalidClaims,
    /// Token carries no permissions claim at all
    #[error("Permissions not included in JWT")]
    PermissionsMissing,
    /// Required permission is not granted
    #[error("Permission not found")]
    PermissionDenied,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::MissingBearer
            | AuthError::MissingToken
            | AuthError::MalformedAuthHeader
            | AuthError::MissingKeyId
            | AuthError::UntrustedAlgorithm
            | AuthError::KeySetUnavailable(_)
            | AuthError::NoMatchingKey => "invalid_header",
            AuthError::UndecodableToken | AuthError::InvalidSignature => "invalid_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims | AuthError::PermissionsMissing => "invalid_claims",
            AuthError::PermissionDenied => "forbidden",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::PermissionsMissing => StatusCode::BAD_REQUEST,
            AuthError::PermissionDenied => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// `"<code>: <description>"`, as surfaced to callers.
    pub fn message(&self) -> String {
        format!("{}: {}", self.error_code(), self)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ErrorEnvelope::new(self.status_code(), self.message()).into_response()
    }
}
