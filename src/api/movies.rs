// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Movie endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};

use crate::{
    auth::Authenticated,
    error::ApiError,
    models::{
        DeletedResponse, MovieListResponse, MovieResponse, MovieUpdate, NewMovie, Pagination,
    },
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/movies",
    params(Pagination),
    tag = "Movies",
    security(("bearer" = ["get:movies"])),
    responses(
        (status = 200, body = MovieListResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks get:movies"),
        (status = 404, description = "Page is empty")
    )
)]
pub async fn list_movies(
    State(state): State<AppState>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<MovieListResponse>, ApiError> {
    let Query(pagination) = query?;
    let (offset, limit) = pagination.window()?;

    let store = state.store.read().await;
    let movies = store.list_movies(offset, limit);
    if movies.is_empty() {
        return Err(ApiError::not_found());
    }

    Ok(Json(MovieListResponse {
        success: true,
        movies: movies.iter().map(|movie| movie.view()).collect(),
        total_movies: store.movie_count(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/movies/{id}",
    params(("id" = u64, Path, description = "Movie ID")),
    tag = "Movies",
    security(("bearer" = ["get:movies"])),
    responses((status = 200, body = MovieResponse), (status = 404))
)]
pub async fn get_movie(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    let Path(id) = id?;
    let movie = state
        .store
        .read()
        .await
        .movie(id)
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(MovieResponse {
        success: true,
        movie: movie.view(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/movies",
    request_body = NewMovie,
    tag = "Movies",
    security(("bearer" = ["post:movies"])),
    responses((status = 201, body = MovieResponse), (status = 400), (status = 422))
)]
pub async fn create_movie(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    payload: Result<Json<NewMovie>, JsonRejection>,
) -> Result<(StatusCode, Json<MovieResponse>), ApiError> {
    let Json(request) = payload?;
    let movie = state.store.write().await.create_movie(request)?;

    tracing::info!(subject = %claims.subject(), movie_id = movie.id, "movie created");
    Ok((
        StatusCode::CREATED,
        Json(MovieResponse {
            success: true,
            movie: movie.view(),
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/movies/{id}",
    params(("id" = u64, Path, description = "Movie ID")),
    request_body = MovieUpdate,
    tag = "Movies",
    security(("bearer" = ["patch:movies"])),
    responses((status = 200, body = MovieResponse), (status = 422))
)]
pub async fn update_movie(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<MovieUpdate>, JsonRejection>,
) -> Result<Json<MovieResponse>, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let movie = state.store.write().await.update_movie(id, request)?;

    tracing::info!(subject = %claims.subject(), movie_id = id, "movie updated");
    Ok(Json(MovieResponse {
        success: true,
        movie: movie.view(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/movies/{id}",
    params(("id" = u64, Path, description = "Movie ID")),
    tag = "Movies",
    security(("bearer" = ["delete:movies"])),
    responses((status = 200, body = DeletedResponse), (status = 422))
)]
pub async fn delete_movie(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let Path(id) = id?;
    let movie = state.store.write().await.delete_movie(id)?;

    tracing::info!(subject = %claims.subject(), movie_id = id, "movie deleted");
    Ok(Json(DeletedResponse {
        success: true,
        deleted: movie.id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_state;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn get_movie_formats_release_date() {
        let state = test_state();
        let movie = state
            .store
            .write()
            .await
            .create_movie(NewMovie {
                title: "Sunrise".into(),
                release_date: NaiveDate::from_ymd_opt(2020, 1, 9).unwrap(),
            })
            .unwrap();

        let Json(body) = get_movie(State(state), Ok(Path(movie.id)))
            .await
            .expect("movie exists");
        assert_eq!(body.movie.release_date, "2020-01-09");
    }

    #[tokio::test]
    async fn get_missing_movie_is_not_found() {
        let err = get_movie(State(test_state()), Ok(Path(7))).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
