// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer-token authentication and permission-scoped authorization for the
//! Casting Agency API.
//!
//! ## Auth Flow
//!
//! 1. Clients obtain an access token from the identity provider
//! 2. Clients send `Authorization: Bearer <JWT>`
//! 3. The server:
//!    - Parses the header (`header`)
//!    - Resolves the signing key by `kid` from the cached JWKS (`jwks`)
//!    - Verifies signature, expiry, audience and issuer (`verifier`)
//!    - Checks the route's required permission (`permissions`)
//!
//! ## Security
//!
//! - Only the configured asymmetric algorithm is accepted
//! - Unknown `kid` triggers one JWKS refresh; no other retries
//! - Permission decisions only ever see verified claims
//! - No clock skew tolerance: `exp` at the current second is expired

pub mod claims;
pub mod error;
pub mod extractor;
pub mod header;
pub mod jwks;
pub mod middleware;
pub mod permissions;
pub mod verifier;

pub use claims::VerifiedClaims;
pub use error::AuthError;
pub use extractor::Authenticated;
pub use header::{extract, BearerToken};
pub use jwks::{HttpKeySource, JwksManager, KeySource, StaticKeySource};
pub use middleware::{requires_auth, AuthGate};
pub use permissions::Permission;
pub use verifier::{TokenVerifier, VerifierConfig};
