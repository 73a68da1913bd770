// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP surface: actor and movie routes under `/api/v1`, each wrapped with
//! the permission it requires, plus health probes and the OpenAPI docs at
//! `/docs`.

use axum::{
    http::HeaderName,
    routing::{delete, get, patch, post, MethodRouter},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{requires_auth, Permission},
    error::{method_not_allowed_fallback, not_found_fallback, panic_response},
    models::{
        ActorListResponse, ActorResponse, ActorUpdate, ActorView, DeletedResponse,
        MovieListResponse, MovieResponse, MovieUpdate, MovieView, NewActor, NewMovie,
    },
    state::AppState,
};

pub mod actors;
pub mod health;
pub mod movies;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub fn router(state: AppState) -> Router {
    let gate = state.gate.clone();
    let guarded = |permission: Permission, route: MethodRouter<AppState>| {
        requires_auth(&gate, permission, route)
    };

    let v1_routes = Router::new()
        .route(
            "/actors",
            guarded(Permission::GetActors, get(actors::list_actors))
                .merge(guarded(Permission::PostActors, post(actors::create_actor))),
        )
        .route(
            "/actors/{id}",
            guarded(Permission::GetActors, get(actors::get_actor))
                .merge(guarded(Permission::PatchActors, patch(actors::update_actor)))
                .merge(guarded(Permission::DeleteActors, delete(actors::delete_actor))),
        )
        .route(
            "/movies",
            guarded(Permission::GetMovies, get(movies::list_movies))
                .merge(guarded(Permission::PostMovies, post(movies::create_movie))),
        )
        .route(
            "/movies/{id}",
            guarded(Permission::GetMovies, get(movies::get_movie))
                .merge(guarded(Permission::PatchMovies, patch(movies::update_movie)))
                .merge(guarded(Permission::DeleteMovies, delete(movies::delete_movie))),
        )
        .method_not_allowed_fallback(method_not_allowed_fallback);

    Router::new()
        .nest("/api/v1", v1_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found_fallback)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        actors::list_actors,
        actors::get_actor,
        actors::create_actor,
        actors::update_actor,
        actors::delete_actor,
        movies::list_movies,
        movies::get_movie,
        movies::create_movie,
        movies::update_movie,
        movies::delete_movie,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            ActorView,
            NewActor,
            ActorUpdate,
            ActorListResponse,
            ActorResponse,
            MovieView,
            NewMovie,
            MovieUpdate,
            MovieListResponse,
            MovieResponse,
            DeletedResponse,
            Permission
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Actors", description = "Actor management"),
        (name = "Movies", description = "Movie management"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
