// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for verified claims.
//!
//! Use the `Authenticated` extractor in handlers to read the caller's
//! identity:
//!
//! ```rust,ignore
//! async fn my_handler(Authenticated(claims): Authenticated) -> impl IntoResponse {
//!     // claims.subject(), claims.permissions()
//! }
//! ```

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use super::{AuthError, AuthGate, VerifiedClaims};

/// Extractor for verified claims.
///
/// Routes wrapped with [`requires_auth`](super::requires_auth) have already
/// been authorized and the claims are taken from request extensions. On
/// any other route the gate runs here, authentication only.
pub struct Authenticated(pub VerifiedClaims);

impl<S> FromRequestParts<S> for Authenticated
where
    AuthGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // First check if middleware already verified the token
        if let Some(claims) = parts.extensions.get::<VerifiedClaims>().cloned() {
            return Ok(Authenticated(claims));
        }

        let gate = AuthGate::from_ref(state);
        let claims = gate.authorize(&parts.headers, None).await?;
        Ok(Authenticated(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{auth_header, test_gate};
    use axum::http::{header::AUTHORIZATION, Request};

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn requires_auth_header() {
        let gate = test_gate();
        let mut parts = parts(None);

        let result = Authenticated::from_request_parts(&mut parts, &gate).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn verifies_token_when_no_gate_ran() {
        let gate = test_gate();
        let header = auth_header(&["get:movies"]);
        let mut parts = parts(Some(&header));

        let Authenticated(claims) = Authenticated::from_request_parts(&mut parts, &gate)
            .await
            .unwrap();
        assert_eq!(claims.subject(), "auth0|casting-assistant");
        assert!(claims.permissions().contains("get:movies"));
    }

    #[tokio::test]
    async fn prefers_extensions() {
        let gate = test_gate();
        let mut parts = parts(None);

        parts
            .extensions
            .insert(VerifiedClaims::fixture("claims_from_middleware", &[]));

        let Authenticated(claims) = Authenticated::from_request_parts(&mut parts, &gate)
            .await
            .unwrap();
        assert_eq!(claims.subject(), "claims_from_middleware");
    }
}
