// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures of the REST API, plus the stored
//! records behind them.
//!
//! ## Model Categories
//!
//! - **Actors**: stored with a date of birth, served with a computed age
//! - **Movies**: stored with a release date, served as `YYYY-MM-DD`
//! - **Envelopes**: every success body carries `success: true`

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;

/// Page size when the client does not ask for one.
pub const PER_PAGE: usize = 10;

// =============================================================================
// Actor Models
// =============================================================================

/// A stored actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: u64,
    pub name: String,
    pub dob: NaiveDate,
    pub gender: String,
}

impl Actor {
    /// Age in whole years on `today`.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.dob).unwrap_or(0)
    }

    pub fn view(&self, today: NaiveDate) -> ActorView {
        ActorView {
            id: self.id,
            name: self.name.clone(),
            age: self.age_on(today),
            gender: self.gender.clone(),
        }
    }
}

/// An actor as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ActorView {
    pub id: u64,
    pub name: String,
    pub age: u32,
    pub gender: String,
}

/// Request body for creating an actor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NewActor {
    pub name: String,
    /// Date of birth (`YYYY-MM-DD`)
    pub dob: NaiveDate,
    pub gender: String,
}

/// Request body for editing an actor. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ActorUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub gender: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActorListResponse {
    pub success: bool,
    pub actors: Vec<ActorView>,
    #[serde(rename = "total-actors")]
    pub total_actors: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ActorResponse {
    pub success: bool,
    pub actor: ActorView,
}

// =============================================================================
// Movie Models
// =============================================================================

/// A stored movie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: u64,
    pub title: String,
    pub release_date: NaiveDate,
}

impl Movie {
    pub fn view(&self) -> MovieView {
        MovieView {
            id: self.id,
            title: self.title.clone(),
            release_date: self.release_date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// A movie as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct MovieView {
    pub id: u64,
    pub title: String,
    pub release_date: String,
}

/// Request body for creating a movie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NewMovie {
    pub title: String,
    /// Release date (`YYYY-MM-DD`)
    pub release_date: NaiveDate,
}

/// Request body for editing a movie. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MovieUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovieListResponse {
    pub success: bool,
    pub movies: Vec<MovieView>,
    #[serde(rename = "total-movies")]
    pub total_movies: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MovieResponse {
    pub success: bool,
    pub movie: MovieView,
}

// =============================================================================
// Shared
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedResponse {
    pub success: bool,
    /// ID of the removed record
    pub deleted: u64,
}

/// `?page=&limit=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
pub struct Pagination {
    /// 1-based page number (default 1)
    pub page: Option<usize>,
    /// Page size (default 10)
    pub limit: Option<usize>,
}

impl Pagination {
    /// `(offset, limit)` for this page. Page and limit must be positive.
    pub fn window(&self) -> Result<(usize, usize), ApiError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(PER_PAGE);
        if page == 0 || limit == 0 {
            return Err(ApiError::bad_request());
        }
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(ApiError::bad_request)?;
        Ok((offset, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn age_counts_whole_years() {
        let actor = Actor {
            id: 1,
            name: "Mugerwa Fred".into(),
            dob: date(1996, 5, 7),
            gender: "male".into(),
        };
        assert_eq!(actor.age_on(date(2026, 5, 6)), 29);
        assert_eq!(actor.age_on(date(2026, 5, 7)), 30);
        assert_eq!(actor.age_on(date(1990, 1, 1)), 0);
    }

    #[test]
    fn movie_view_formats_release_date() {
        let movie = Movie {
            id: 3,
            title: "Sunrise".into(),
            release_date: date(2020, 1, 9),
        };
        let json = serde_json::to_value(movie.view()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 3, "title": "Sunrise", "release_date": "2020-01-09" })
        );
    }

    #[test]
    fn list_envelopes_use_hyphenated_totals() {
        let body = ActorListResponse {
            success: true,
            actors: vec![],
            total_actors: 0,
        };
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["total-actors"], 0);
    }

    #[test]
    fn pagination_defaults_and_offsets() {
        assert_eq!(Pagination::default().window().unwrap(), (0, PER_PAGE));
        let page = Pagination {
            page: Some(3),
            limit: Some(5),
        };
        assert_eq!(page.window().unwrap(), (10, 5));
    }

    #[test]
    fn pagination_rejects_zero() {
        let page = Pagination {
            page: Some(0),
            limit: None,
        };
        assert_eq!(page.window().unwrap_err().status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_value::<ActorUpdate>(serde_json::json!({ "height": 180 }));
        assert!(result.is_err());
    }
}
