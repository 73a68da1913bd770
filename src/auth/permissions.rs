// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Permissions and the permission check.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthError, VerifiedClaims};

/// Permissions a protected route may require.
///
/// ## Scopes
///
/// - `get:*` - read actors or movies
/// - `post:*` - create
/// - `patch:*` - edit
/// - `delete:*` - remove
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Permission {
    #[serde(rename = "get:actors")]
    GetActors,
    #[serde(rename = "post:actors")]
    PostActors,
    #[serde(rename = "patch:actors")]
    PatchActors,
    #[serde(rename = "delete:actors")]
    DeleteActors,
    #[serde(rename = "get:movies")]
    GetMovies,
    #[serde(rename = "post:movies")]
    PostMovies,
    #[serde(rename = "patch:movies")]
    PatchMovies,
    #[serde(rename = "delete:movies")]
    DeleteMovies,
}

impl Permission {
    pub const ALL: [Permission; 8] = [
        Permission::GetActors,
        Permission::PostActors,
        Permission::PatchActors,
        Permission::DeleteActors,
        Permission::GetMovies,
        Permission::PostMovies,
        Permission::PatchMovies,
        Permission::DeleteMovies,
    ];

    /// The scope string as it appears in the token's `permissions` claim.
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::GetActors => "get:actors",
            Permission::PostActors => "post:actors",
            Permission::PatchActors => "patch:actors",
            Permission::DeleteActors => "delete:actors",
            Permission::GetMovies => "get:movies",
            Permission::PostMovies => "post:movies",
            Permission::PatchMovies => "patch:movies",
            Permission::DeleteMovies => "delete:movies",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission `{0}`")]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// Confirm that verified claims grant `required`.
///
/// `None` means the route only needs an authenticated caller.
pub fn check(claims: &VerifiedClaims, required: Option<Permission>) -> Result<(), AuthError> {
    let Some(required) = required else {
        return Ok(());
    };

    if claims.permissions().is_empty() {
        return Err(AuthError::PermissionsMissing);
    }

    if !claims.has_permission(required) {
        return Err(AuthError::PermissionDenied);
    }

    Ok(())
}
