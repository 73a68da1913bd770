// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and the verified claims handed to handlers.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Permission;

/// Payload of an access token issued by the identity provider.
///
/// Decoding fails closed: a missing or mistyped `sub`, `iss`, `aud` or
/// `exp` rejects the token. Only `permissions` is optional.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenClaims {
    /// Subject (user or client ID)
    pub sub: String,

    /// Issuer (identity provider tenant URL)
    pub iss: String,

    /// Audience, a single value or a list
    pub aud: Audience,

    /// Expiration timestamp
    pub exp: i64,

    /// Granted scopes (RBAC permissions claim)
    #[serde(default)]
    pub permissions: Option<Vec<String>>,
}

/// `aud` claim, which may be a string or an array of strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    pub fn contains(&self, expected: &str) -> bool {
        match self {
            Audience::One(aud) => aud == expected,
            Audience::Many(auds) => auds.iter().any(|aud| aud == expected),
        }
    }
}

/// Claims of a token that passed signature and standard-claim validation.
///
/// Fields are private: only the token verifier can produce these, so the
/// claims a handler sees always come from a verified token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct VerifiedClaims {
    subject: String,
    audience: String,
    issuer: String,
    /// Unix timestamp
    expires_at: i64,
    /// Empty when the claim is absent
    permissions: BTreeSet<String>,
}

impl VerifiedClaims {
    pub(crate) fn from_token(claims: TokenClaims, audience: &str) -> Self {
        Self {
            subject: claims.sub,
            audience: audience.to_string(),
            issuer: claims.iss,
            expires_at: claims.exp,
            permissions: claims.permissions.unwrap_or_default().into_iter().collect(),
        }
    }

    /// Claims for handler and permission tests that bypass the verifier.
    #[cfg(test)]
    pub(crate) fn fixture(subject: &str, permissions: &[&str]) -> Self {
        Self {
            subject: subject.to_string(),
            audience: "agency".to_string(),
            issuer: "https://casting-agency.auth0.com/".to_string(),
            expires_at: 4_102_444_800,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Audience the token was accepted for.
    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn expires_at(&self) -> i64 {
        self.expires_at
    }

    pub fn permissions(&self) -> &BTreeSet<String> {
        &self.permissions
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(permission.as_str())
    }
}
