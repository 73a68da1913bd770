// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Casting Agency - JWT-protected resource server
//!
//! Exposes actor and movie records behind bearer-token authorization. Tokens
//! are RS256 JWTs issued by an external identity provider and verified
//! against its published JWK set, which is cached and refreshed on key
//! rotation.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Bearer extraction, JWT verification, JWK set cache, permission checks
//! - `config` - Environment configuration
//! - `store` - In-memory actor and movie records

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod state;
pub mod store;
pub mod tls;

#[cfg(test)]
mod testutil;
