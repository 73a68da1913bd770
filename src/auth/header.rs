// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! `Authorization: Bearer <token>` parsing.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use super::AuthError;

/// Raw token taken from the authorization header.
///
/// Lives for a single authorization check. `Debug` never prints the token.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(..)")
    }
}

/// Extract the bearer token from a raw header value.
///
/// The scheme must be exactly `Bearer`, followed by exactly one token.
pub fn extract(raw_header: Option<&str>) -> Result<BearerToken, AuthError> {
    let raw = match raw_header {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Err(AuthError::MissingAuthHeader),
    };

    let mut parts = raw.split_whitespace();
    if parts.next() != Some("Bearer") {
        return Err(AuthError::MissingBearer);
    }

    let token = parts.next().ok_or(AuthError::MissingToken)?;
    if parts.next().is_some() {
        return Err(AuthError::MalformedAuthHeader);
    }

    Ok(BearerToken(token.to_string()))
}

/// Extract the bearer token from request headers.
///
/// A header that is not visible ASCII cannot hold a well-formed
/// `Bearer <token>` pair and is rejected as malformed.
pub fn extract_from_headers(headers: &HeaderMap) -> Result<BearerToken, AuthError> {
    let value = match headers.get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AuthError::MalformedAuthHeader)?,
        ),
        None => None,
    };
    extract(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn absent_or_empty_header_is_missing() {
        assert_eq!(extract(None), Err(AuthError::MissingAuthHeader));
        assert_eq!(extract(Some("")), Err(AuthError::MissingAuthHeader));
        assert_eq!(extract(Some("   ")), Err(AuthError::MissingAuthHeader));
    }

    #[test]
    fn token_without_scheme_is_missing_bearer() {
        assert_eq!(extract(Some("eyJhbGciOi.abc.def")), Err(AuthError::MissingBearer));
    }

    #[test]
    fn scheme_is_case_sensitive() {
        assert_eq!(extract(Some("bearer abc")), Err(AuthError::MissingBearer));
        assert_eq!(extract(Some("BEARER abc")), Err(AuthError::MissingBearer));
        assert_eq!(extract(Some("Bearerabc")), Err(AuthError::MissingBearer));
    }

    #[test]
    fn bearer_with_trailing_space_is_missing_token() {
        assert_eq!(extract(Some("Bearer ")), Err(AuthError::MissingToken));
        assert_eq!(extract(Some("Bearer")), Err(AuthError::MissingToken));
    }

    #[test]
    fn extra_parts_are_malformed() {
        assert_eq!(
            extract(Some("Bearer abc.def.ghi extra")),
            Err(AuthError::MalformedAuthHeader)
        );
    }

    #[test]
    fn well_formed_header_yields_token() {
        let token = extract(Some("Bearer abc.def.ghi")).unwrap();
        assert_eq!(token.as_str(), "abc.def.ghi");
        assert_eq!(format!("{token:?}"), "BearerToken(..)");
    }

    #[test]
    fn extract_from_headers_reads_authorization() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            extract_from_headers(&headers),
            Err(AuthError::MissingAuthHeader)
        );

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(extract_from_headers(&headers).unwrap().as_str(), "tok");

        headers.insert(AUTHORIZATION, HeaderValue::from_bytes(b"Bearer \xff").unwrap());
        assert_eq!(
            extract_from_headers(&headers),
            Err(AuthError::MalformedAuthHeader)
        );
    }
}
