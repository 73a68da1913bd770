// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token signature and standard-claim verification.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. Decode the unverified header
//! 2. Require the trusted algorithm (no downgrade to HS*/none)
//! 3. Resolve the signing key by `kid`
//! 4. Verify the signature and decode the typed payload
//! 5. `exp` strictly in the future, then audience and issuer

use std::{str::FromStr, sync::Arc};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{decode, decode_header, errors::ErrorKind, Algorithm, Validation};
use serde::Deserialize;

use super::claims::TokenClaims;
use super::jwks::{JwksManager, SigningKey};
use super::{AuthError, BearerToken, VerifiedClaims};

/// What a token must carry to be accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Expected `aud`
    pub audience: String,
    /// Expected `iss`
    pub issuer: String,
    /// The only algorithm tokens may be signed with
    pub algorithm: Algorithm,
}

/// Verifies bearer tokens against the provider's signing keys.
pub struct TokenVerifier {
    keys: Arc<JwksManager>,
    config: VerifierConfig,
}

impl TokenVerifier {
    pub fn new(keys: Arc<JwksManager>, config: VerifierConfig) -> Self {
        Self { keys, config }
    }

    pub fn keys(&self) -> &Arc<JwksManager> {
        &self.keys
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify against the configured audience and issuer.
    pub async fn verify(&self, token: &BearerToken) -> Result<VerifiedClaims, AuthError> {
        self.verify_for(token, &self.config.audience, &self.config.issuer)
            .await
    }

    /// Verify against an explicit audience and issuer.
    pub async fn verify_for(
        &self,
        token: &BearerToken,
        expected_audience: &str,
        expected_issuer: &str,
    ) -> Result<VerifiedClaims, AuthError> {
        let header = decode_header(token.as_str())
            .map_err(|_| self.classify_undecodable_header(token))?;

        if header.alg != self.config.algorithm {
            tracing::debug!(alg = ?header.alg, "token signed with untrusted algorithm");
            return Err(AuthError::UntrustedAlgorithm);
        }

        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;
        let key = self.keys.resolve_key(&kid).await?;

        if key.algorithm.is_some_and(|alg| alg != self.config.algorithm) {
            tracing::debug!(kid = %kid, key_alg = ?key.algorithm, "key published for another algorithm");
            return Err(AuthError::UntrustedAlgorithm);
        }

        let claims = decode_signed(token, &key, self.config.algorithm)?;

        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::TokenExpired);
        }

        if !claims.aud.contains(expected_audience) || claims.iss != expected_issuer {
            return Err(AuthError::InvalidClaims);
        }

        Ok(VerifiedClaims::from_token(claims, expected_audience))
    }

    /// A header jsonwebtoken cannot parse may still be well-formed JSON
    /// naming an algorithm it has no variant for, such as `none`. That is
    /// an algorithm rejection, not a decoding failure.
    fn classify_undecodable_header(&self, token: &BearerToken) -> AuthError {
        match declared_algorithm(token.as_str()) {
            Some(alg) if Algorithm::from_str(&alg).ok() != Some(self.config.algorithm) => {
                tracing::debug!(%alg, "token declares untrusted algorithm");
                AuthError::UntrustedAlgorithm
            }
            _ => AuthError::UndecodableToken,
        }
    }
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// `alg` from a three-segment token's header, read without any other
/// header validation.
fn declared_algorithm(token: &str) -> Option<String> {
    let mut segments = token.split('.');
    let header = segments.next()?;
    if segments.count() != 2 {
        return None;
    }
    let bytes = URL_SAFE_NO_PAD.decode(header).ok()?;
    serde_json::from_slice::<RawHeader>(&bytes)
        .ok()
        .map(|raw| raw.alg)
}

/// Verify the signature and decode the payload.
///
/// Claim validation is done by the caller so the order and the expiry
/// boundary stay under our control.
fn decode_signed(
    token: &BearerToken,
    key: &SigningKey,
    algorithm: Algorithm,
) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(algorithm);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation.leeway = 0;

    decode::<TokenClaims>(token.as_str(), &key.decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => AuthError::UndecodableToken,
            _ => AuthError::InvalidSignature,
        })
}
