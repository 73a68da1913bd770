// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! ## Cache policy
//!
//! - The key set is fetched lazily on first use
//! - A `kid` missing from the cache triggers one synchronous refresh, which
//!   picks up rotated keys without a restart
//! - Concurrent misses and cold loads share one fetch: the refresh mutex is
//!   held across the fetch, and waiters reuse its outcome, success or
//!   failure, instead of fetching again
//! - Readers always see a whole key set, old or new
//! - A failed fetch leaves the previous set in place
//!
//! ## Usage
//!
//! Build a [`JwksManager`] from an [`HttpKeySource`] in `main.rs` and hand it
//! to the token verifier. Tests use [`StaticKeySource`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm, PublicKeyUse};
use jsonwebtoken::{Algorithm, DecodingKey};
use tokio::sync::{Mutex, RwLock};
use url::Url;

use super::error::AuthError;

/// Where signing keys come from.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Fetch the complete current key set.
    async fn fetch(&self) -> Result<JwkSet, AuthError>;
}

/// Key source backed by the identity provider's published JWKS endpoint.
pub struct HttpKeySource {
    jwks_url: Url,
    client: reqwest::Client,
}

impl HttpKeySource {
    /// Create a source for `jwks_url`, applying `timeout` to every fetch.
    pub fn new(jwks_url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { jwks_url, client })
    }

    pub fn jwks_url(&self) -> &Url {
        &self.jwks_url
    }
}

#[async_trait]
impl KeySource for HttpKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        let response = self
            .client
            .get(self.jwks_url.clone())
            .send()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::KeySetUnavailable(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))
    }
}

/// Fixed key set, for tests and deployments with pinned keys.
pub struct StaticKeySource(JwkSet);

impl StaticKeySource {
    pub fn new(jwks: JwkSet) -> Self {
        Self(jwks)
    }
}

#[async_trait]
impl KeySource for StaticKeySource {
    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        Ok(self.0.clone())
    }
}

/// A public signing key from the provider's key set.
#[derive(Clone)]
pub struct SigningKey {
    pub key_id: String,
    /// Algorithm declared by the JWK, if any
    pub algorithm: Option<Algorithm>,
    pub(crate) decoding_key: DecodingKey,
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Signing keys indexed by `kid`.
#[derive(Debug, Default)]
pub struct KeySet {
    keys: HashMap<String, Arc<SigningKey>>,
}

impl KeySet {
    /// Admit the RSA signing keys of `jwks` that carry a `kid`.
    pub fn from_jwks(jwks: &JwkSet) -> Self {
        let mut keys = HashMap::with_capacity(jwks.keys.len());
        for jwk in &jwks.keys {
            let Some(key) = signing_key(jwk) else {
                continue;
            };
            if keys.contains_key(&key.key_id) {
                tracing::warn!(kid = %key.key_id, "duplicate kid in key set, keeping first");
                continue;
            }
            keys.insert(key.key_id.clone(), Arc::new(key));
        }
        Self { keys }
    }

    pub fn get(&self, key_id: &str) -> Option<Arc<SigningKey>> {
        self.keys.get(key_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

struct CacheState {
    keys: Arc<KeySet>,
    /// Bumped on every successful refresh
    generation: u64,
    /// Bumped on every fetch, successful or not
    attempts: u64,
    /// Outcome of the latest fetch when it failed
    last_failure: Option<AuthError>,
    fetched_at: Option<Instant>,
}

/// JWKS manager with caching.
///
/// All fetches go through `refresh_lock`. A caller that waited on the lock
/// while another fetch ran reuses that fetch's outcome instead of issuing
/// its own, so concurrent misses collapse into one request to the
/// identity provider.
pub struct JwksManager {
    source: Arc<dyn KeySource>,
    cache: RwLock<CacheState>,
    refresh_lock: Mutex<()>,
}

impl JwksManager {
    pub fn new(source: Arc<dyn KeySource>) -> Self {
        Self {
            source,
            cache: RwLock::new(CacheState {
                keys: Arc::new(KeySet::default()),
                generation: 0,
                attempts: 0,
                last_failure: None,
                fetched_at: None,
            }),
            refresh_lock: Mutex::new(()),
        }
    }

    async fn snapshot(&self) -> (Arc<KeySet>, u64) {
        let cache = self.cache.read().await;
        (cache.keys.clone(), cache.attempts)
    }

    /// Resolve the signing key for `key_id`, refreshing once on a miss.
    pub async fn resolve_key(&self, key_id: &str) -> Result<Arc<SigningKey>, AuthError> {
        let (keys, seen) = self.snapshot().await;
        if let Some(key) = keys.get(key_id) {
            return Ok(key);
        }

        tracing::debug!(kid = %key_id, "kid not cached, refreshing key set");
        let keys = self.refresh_unless_attempted_since(seen).await?;

        keys.get(key_id).ok_or_else(|| {
            tracing::debug!(kid = %key_id, "kid not present after refresh");
            AuthError::NoMatchingKey
        })
    }

    /// Fetch the key set if it has never been loaded.
    pub async fn ensure_loaded(&self) -> Result<(), AuthError> {
        let seen = {
            let cache = self.cache.read().await;
            if cache.fetched_at.is_some() {
                return Ok(());
            }
            cache.attempts
        };
        self.refresh_unless_attempted_since(seen).await.map(|_| ())
    }

    /// Refresh the key set, joining a fetch already in flight.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let (_, seen) = self.snapshot().await;
        self.refresh_unless_attempted_since(seen).await.map(|_| ())
    }

    /// Fetch under `refresh_lock` unless a fetch was attempted after the
    /// caller observed attempt `seen`; in that case return its outcome.
    async fn refresh_unless_attempted_since(&self, seen: u64) -> Result<Arc<KeySet>, AuthError> {
        let _refresh = self.refresh_lock.lock().await;

        {
            let cache = self.cache.read().await;
            if cache.attempts != seen {
                return match &cache.last_failure {
                    Some(err) => Err(err.clone()),
                    None => Ok(cache.keys.clone()),
                };
            }
        }

        self.fetch_and_store().await
    }

    /// Caller must hold `refresh_lock`.
    async fn fetch_and_store(&self) -> Result<Arc<KeySet>, AuthError> {
        let fetched = self.source.fetch().await;
        let mut cache = self.cache.write().await;
        cache.attempts += 1;

        let jwks = match fetched {
            Ok(jwks) => jwks,
            Err(err) => {
                if let AuthError::KeySetUnavailable(reason) = &err {
                    tracing::warn!(%reason, "failed to fetch signing keys");
                }
                cache.last_failure = Some(err.clone());
                return Err(err);
            }
        };

        let keys = Arc::new(KeySet::from_jwks(&jwks));
        cache.keys = keys.clone();
        cache.generation += 1;
        cache.last_failure = None;
        cache.fetched_at = Some(Instant::now());
        tracing::info!(keys = keys.len(), generation = cache.generation, "signing key set refreshed");
        Ok(keys)
    }

    /// Whether a key set has been fetched at least once.
    pub async fn is_cached(&self) -> bool {
        self.cache.read().await.fetched_at.is_some()
    }

    /// When the current key set was fetched.
    pub async fn last_fetched(&self) -> Option<Instant> {
        self.cache.read().await.fetched_at
    }

    /// Sorted key IDs of the cached set.
    pub async fn key_ids(&self) -> Vec<String> {
        let (keys, _) = self.snapshot().await;
        let mut ids: Vec<String> = keys.keys.keys().cloned().collect();
        ids.sort();
        ids
    }
}

/// Convert a JWK to a signing key, skipping anything not usable for RSA
/// signature verification.
fn signing_key(jwk: &Jwk) -> Option<SigningKey> {
    let Some(key_id) = jwk.common.key_id.clone() else {
        tracing::debug!("skipping JWK without kid");
        return None;
    };

    if matches!(jwk.common.public_key_use, Some(PublicKeyUse::Encryption)) {
        tracing::debug!(kid = %key_id, "skipping encryption key");
        return None;
    }

    let AlgorithmParameters::RSA(rsa) = &jwk.algorithm else {
        tracing::debug!(kid = %key_id, "skipping non-RSA key");
        return None;
    };

    let algorithm = match jwk.common.key_algorithm {
        None => None,
        Some(KeyAlgorithm::RS256) => Some(Algorithm::RS256),
        Some(KeyAlgorithm::RS384) => Some(Algorithm::RS384),
        Some(KeyAlgorithm::RS512) => Some(Algorithm::RS512),
        Some(KeyAlgorithm::PS256) => Some(Algorithm::PS256),
        Some(KeyAlgorithm::PS384) => Some(Algorithm::PS384),
        Some(KeyAlgorithm::PS512) => Some(Algorithm::PS512),
        Some(other) => {
            tracing::debug!(kid = %key_id, alg = ?other, "skipping key with non-signing algorithm");
            return None;
        }
    };

    match DecodingKey::from_rsa_components(&rsa.n, &rsa.e) {
        Ok(decoding_key) => Some(SigningKey {
            key_id,
            algorithm,
            decoding_key,
        }),
        Err(e) => {
            tracing::warn!(kid = %key_id, error = %e, "skipping unusable RSA key");
            None
        }
    }
}
