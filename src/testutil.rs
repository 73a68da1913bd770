// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests: RS256 keys, token builders and a
//! scriptable key source.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

use crate::auth::jwks::{JwksManager, KeySource, StaticKeySource};
use crate::auth::{extract, AuthError, AuthGate, BearerToken, TokenVerifier, VerifierConfig};
use crate::state::AppState;
use crate::store::InMemoryStore;

/// Public half of [`SIGNING_KEY_PEM`], published as `test-key-1`.
pub const JWKS_JSON: &str = include_str!("../testdata/jwks.json");
/// `test-key-1` plus [`ROGUE_KEY_PEM`]'s public half as `test-key-2`.
pub const ROTATED_JWKS_JSON: &str = include_str!("../testdata/jwks_rotated.json");
pub const SIGNING_KEY_PEM: &str = include_str!("../testdata/signing_key.pem");
pub const ROGUE_KEY_PEM: &str = include_str!("../testdata/rogue_key.pem");

pub const AUDIENCE: &str = "agency";
pub const ISSUER: &str = "https://casting-agency.auth0.com/";

pub fn jwk_set(json: &str) -> JwkSet {
    serde_json::from_str(json).expect("fixture JWKS parses")
}

/// Payload for a token that expires in an hour.
pub fn claims_json(permissions: &[&str]) -> serde_json::Value {
    let now = Utc::now().timestamp();
    serde_json::json!({
        "iss": ISSUER,
        "sub": "auth0|casting-assistant",
        "aud": AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    })
}

/// RS256-sign `claims` with a PEM private key.
pub fn sign(claims: &serde_json::Value, kid: Option<&str>, private_pem: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(private_pem.as_bytes()).expect("fixture key parses");
    encode(&header, claims, &key).expect("token signs")
}

/// Assemble a token from raw JSON parts with a junk signature.
pub fn craft_raw_jwt(header: &serde_json::Value, payload: &serde_json::Value) -> String {
    let header_b64 = URL_SAFE_NO_PAD.encode(header.to_string());
    let payload_b64 = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{header_b64}.{payload_b64}.c2lnbmF0dXJl")
}

pub fn bearer(token: &str) -> BearerToken {
    extract(Some(&format!("Bearer {token}"))).expect("token has no whitespace")
}

pub fn verifier_config() -> VerifierConfig {
    VerifierConfig {
        audience: AUDIENCE.to_string(),
        issuer: ISSUER.to_string(),
        algorithm: Algorithm::RS256,
    }
}

pub fn test_verifier() -> TokenVerifier {
    let keys = JwksManager::new(Arc::new(StaticKeySource::new(jwk_set(JWKS_JSON))));
    TokenVerifier::new(Arc::new(keys), verifier_config())
}

pub fn test_gate() -> AuthGate {
    AuthGate::new(Arc::new(test_verifier()))
}

pub fn test_state() -> AppState {
    AppState::new(InMemoryStore::new(), test_gate())
}

/// Valid `Authorization` header value carrying `permissions`.
pub fn auth_header(permissions: &[&str]) -> String {
    format!(
        "Bearer {}",
        sign(&claims_json(permissions), Some("test-key-1"), SIGNING_KEY_PEM)
    )
}

/// Key source that replays a scripted sequence of key sets and counts
/// fetches. The last set repeats once the script runs out.
pub struct CountingKeySource {
    sets: Mutex<Vec<JwkSet>>,
    pub fetches: AtomicUsize,
    delay: Option<Duration>,
    fail_after: Option<usize>,
}

impl CountingKeySource {
    pub fn new(mut sets: Vec<JwkSet>) -> Self {
        sets.reverse();
        Self {
            sets: Mutex::new(sets),
            fetches: AtomicUsize::new(0),
            delay: None,
            fail_after: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every fetch after the first `n`.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }
}

#[async_trait]
impl KeySource for CountingKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let count = self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_after.is_some_and(|n| count >= n) {
            return Err(AuthError::KeySetUnavailable("scripted failure".into()));
        }

        let mut sets = self.sets.lock().unwrap();
        if sets.len() > 1 {
            Ok(sets.pop().unwrap())
        } else {
            Ok(sets.last().cloned().unwrap_or(JwkSet { keys: Vec::new() }))
        }
    }
}
