// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Actor endpoints. Each route is wrapped with its permission in
//! [`router`](super::router).

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    auth::Authenticated,
    error::ApiError,
    models::{
        ActorListResponse, ActorResponse, ActorUpdate, DeletedResponse, NewActor, Pagination,
    },
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/actors",
    params(Pagination),
    tag = "Actors",
    security(("bearer" = ["get:actors"])),
    responses(
        (status = 200, body = ActorListResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Token lacks get:actors"),
        (status = 404, description = "Page is empty")
    )
)]
pub async fn list_actors(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<ActorListResponse>, ApiError> {
    let Query(pagination) = query?;
    let (offset, limit) = pagination.window()?;

    let store = state.store.read().await;
    let actors = store.list_actors(offset, limit);
    if actors.is_empty() {
        return Err(ApiError::not_found());
    }

    tracing::debug!(subject = %claims.subject(), offset, count = actors.len(), "listing actors");
    let today = Utc::now().date_naive();
    Ok(Json(ActorListResponse {
        success: true,
        actors: actors.iter().map(|actor| actor.view(today)).collect(),
        total_actors: store.actor_count(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/actors/{id}",
    params(("id" = u64, Path, description = "Actor ID")),
    tag = "Actors",
    security(("bearer" = ["get:actors"])),
    responses((status = 200, body = ActorResponse), (status = 404))
)]
pub async fn get_actor(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<ActorResponse>, ApiError> {
    let Path(id) = id?;
    let actor = state
        .store
        .read()
        .await
        .actor(id)
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(ActorResponse {
        success: true,
        actor: actor.view(Utc::now().date_naive()),
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/actors",
    request_body = NewActor,
    tag = "Actors",
    security(("bearer" = ["post:actors"])),
    responses((status = 201, body = ActorResponse), (status = 400), (status = 422))
)]
pub async fn create_actor(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    payload: Result<Json<NewActor>, JsonRejection>,
) -> Result<(StatusCode, Json<ActorResponse>), ApiError> {
    let Json(request) = payload?;
    let actor = state.store.write().await.create_actor(request)?;

    tracing::info!(subject = %claims.subject(), actor_id = actor.id, "actor created");
    Ok((
        StatusCode::CREATED,
        Json(ActorResponse {
            success: true,
            actor: actor.view(Utc::now().date_naive()),
        }),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/actors/{id}",
    params(("id" = u64, Path, description = "Actor ID")),
    request_body = ActorUpdate,
    tag = "Actors",
    security(("bearer" = ["patch:actors"])),
    responses((status = 200, body = ActorResponse), (status = 422))
)]
pub async fn update_actor(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    payload: Result<Json<ActorUpdate>, JsonRejection>,
) -> Result<Json<ActorResponse>, ApiError> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let actor = state.store.write().await.update_actor(id, request)?;

    tracing::info!(subject = %claims.subject(), actor_id = id, "actor updated");
    Ok(Json(ActorResponse {
        success: true,
        actor: actor.view(Utc::now().date_naive()),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/actors/{id}",
    params(("id" = u64, Path, description = "Actor ID")),
    tag = "Actors",
    security(("bearer" = ["delete:actors"])),
    responses((status = 200, body = DeletedResponse), (status = 422))
)]
pub async fn delete_actor(
    Authenticated(claims): Authenticated,
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let Path(id) = id?;
    let actor = state.store.write().await.delete_actor(id)?;

    tracing::info!(subject = %claims.subject(), actor_id = id, "actor deleted");
    Ok(Json(DeletedResponse {
        success: true,
        deleted: actor.id,
    }))
}
