// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization gate and its axum middleware.
//!
//! [`AuthGate`] runs header extraction, token verification and the
//! permission check in that order, stopping at the first failure.
//! [`requires_auth`] wraps a route with the gate:
//!
//! ```rust,ignore
//! let route = requires_auth(&gate, Permission::GetActors, get(actors::list_actors));
//! ```
//!
//! On success the [`VerifiedClaims`] are added to request extensions for
//! the [`Authenticated`](super::Authenticated) extractor. On failure the
//! error response is returned and the handler never runs.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::MethodRouter,
};

use super::{header, permissions, AuthError, Permission, TokenVerifier, VerifiedClaims};

/// Header → token → permission pipeline. Holds no state of its own.
#[derive(Clone)]
pub struct AuthGate {
    verifier: Arc<TokenVerifier>,
}

impl AuthGate {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Authorize a request carrying `headers` for `required`.
    pub async fn authorize(
        &self,
        headers: &HeaderMap,
        required: Option<Permission>,
    ) -> Result<VerifiedClaims, AuthError> {
        let token = header::extract_from_headers(headers)?;
        let claims = self.verifier.verify(&token).await?;
        permissions::check(&claims, required)?;
        Ok(claims)
    }
}

/// Middleware state: the gate plus the permission one route requires.
#[derive(Clone)]
pub struct Guard {
    gate: AuthGate,
    permission: Option<Permission>,
}

/// Authentication middleware function.
pub async fn enforce(State(guard): State<Guard>, mut request: Request, next: Next) -> Response {
    match guard.gate.authorize(request.headers(), guard.permission).await {
        Ok(claims) => {
            tracing::debug!(
                subject = %claims.subject(),
                permission = ?guard.permission,
                "request authorized"
            );
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            tracing::debug!(
                code = e.error_code(),
                status = e.status_code().as_u16(),
                reason = %e,
                permission = ?guard.permission,
                path = %request.uri().path(),
                "request rejected"
            );
            e.into_response()
        }
    }
}

/// Wrap `route` so it only runs for callers granted `permission`.
///
/// Pass `None` to require authentication alone.
pub fn requires_auth<S>(
    gate: &AuthGate,
    permission: impl Into<Option<Permission>>,
    route: MethodRouter<S>,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let guard = Guard {
        gate: gate.clone(),
        permission: permission.into(),
    };
    route.route_layer(middleware::from_fn_with_state(guard, enforce))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{auth_header, claims_json, sign, test_gate, SIGNING_KEY_PEM};
    use axum::{
        body::{to_bytes, Body},
        http::{header::AUTHORIZATION, StatusCode},
        routing::get,
        Extension, Router,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn counting_app(permission: Option<Permission>) -> (Router, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let handler = get(move |Extension(claims): Extension<VerifiedClaims>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                claims.subject().to_string()
            }
        });
        let app = Router::new().route("/guarded", requires_auth(&test_gate(), permission, handler));
        (app, calls)
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut request = axum::http::Request::builder().uri("/guarded");
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()));
        (status, body)
    }

    #[tokio::test]
    async fn granted_permission_runs_handler_once_with_subject() {
        let (app, calls) = counting_app(Some(Permission::GetActors));
        let header = auth_header(&["get:actors"]);

        let (status, body) = call(app, Some(&header)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "auth0|casting-assistant");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let (app, calls) = counting_app(Some(Permission::GetActors));
        let (status, body) = call(app, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": 401,
                "message": "invalid_header: Authorization header missing"
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn token_without_bearer_scheme_is_rejected() {
        let (app, _) = counting_app(Some(Permission::GetActors));
        let header = auth_header(&["get:actors"]);
        let token = header.strip_prefix("Bearer ").unwrap();

        let (status, body) = call(app, Some(token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["message"],
            r#"invalid_header: "Bearer" missing from Authorization header"#
        );
    }

    #[tokio::test]
    async fn empty_token_is_rejected() {
        let (app, _) = counting_app(Some(Permission::GetActors));
        let (status, body) = call(app, Some("Bearer ")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "invalid_header: Token missing from Authorization header");
    }

    #[tokio::test]
    async fn extra_header_part_is_rejected() {
        let (app, _) = counting_app(Some(Permission::GetActors));
        let header = format!("{} extra", auth_header(&["get:actors"]));
        let (status, body) = call(app, Some(&header)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["message"],
            r#"invalid_header: Authorization header must be "bearer token""#
        );
    }

    #[tokio::test]
    async fn missing_scope_is_forbidden_without_side_effects() {
        let (app, calls) = counting_app(Some(Permission::DeleteMovies));
        let header = auth_header(&["get:movies"]);

        let (status, body) = call(app, Some(&header)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "forbidden: Permission not found");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn absent_permissions_claim_is_bad_request() {
        let (app, calls) = counting_app(Some(Permission::GetActors));
        let mut claims = claims_json(&[]);
        claims.as_object_mut().unwrap().remove("permissions");
        let header = format!("Bearer {}", sign(&claims, Some("test-key-1"), SIGNING_KEY_PEM));

        let (status, body) = call(app, Some(&header)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "invalid_claims: Permissions not included in JWT");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_signing_key_never_reaches_handler() {
        let (app, calls) = counting_app(Some(Permission::GetActors));
        let token = sign(&claims_json(&["get:actors"]), Some("rotated-out"), SIGNING_KEY_PEM);

        let (status, body) = call(app, Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "invalid_header: Unable to find appropriate key");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn authentication_only_route_ignores_permissions() {
        let (app, calls) = counting_app(None);
        let mut claims = claims_json(&[]);
        claims.as_object_mut().unwrap().remove("permissions");
        let header = format!("Bearer {}", sign(&claims, Some("test-key-1"), SIGNING_KEY_PEM));

        let (status, _) = call(app, Some(&header)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn authorize_short_circuits_on_header() {
        let gate = test_gate();
        let err = gate
            .authorize(&HeaderMap::new(), Some(Permission::GetActors))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::MissingAuthHeader);
        assert!(!gate.verifier().keys().is_cached().await);
    }
}
