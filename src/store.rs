// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory store for actors and movies.
//!
//! Records are kept in ID order so pages are stable. IDs are assigned
//! sequentially from 1 and never reused.

use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::models::{Actor, ActorUpdate, Movie, MovieUpdate, NewActor, NewMovie};

#[derive(Debug, Default)]
pub struct InMemoryStore {
    actors: BTreeMap<u64, Actor>,
    movies: BTreeMap<u64, Movie>,
    last_actor_id: u64,
    last_movie_id: u64,
}

fn require_text(value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        Err(ApiError::unprocessable())
    } else {
        Ok(())
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_actors(&self, offset: usize, limit: usize) -> Vec<Actor> {
        self.actors.values().skip(offset).take(limit).cloned().collect()
    }

    pub fn actor_count(&self) -> usize {
        self.actors.len()
    }

    pub fn actor(&self, id: u64) -> Option<Actor> {
        self.actors.get(&id).cloned()
    }

    pub fn create_actor(&mut self, request: NewActor) -> Result<Actor, ApiError> {
        require_text(&request.name)?;
        require_text(&request.gender)?;

        self.last_actor_id += 1;
        let actor = Actor {
            id: self.last_actor_id,
            name: request.name,
            dob: request.dob,
            gender: request.gender,
        };
        self.actors.insert(actor.id, actor.clone());
        Ok(actor)
    }

    pub fn update_actor(&mut self, id: u64, request: ActorUpdate) -> Result<Actor, ApiError> {
        let actor = self
            .actors
            .get_mut(&id)
            .ok_or_else(ApiError::unprocessable)?;

        if let Some(name) = &request.name {
            require_text(name)?;
        }
        if let Some(gender) = &request.gender {
            require_text(gender)?;
        }

        if let Some(name) = request.name {
            actor.name = name;
        }
        if let Some(dob) = request.dob {
            actor.dob = dob;
        }
        if let Some(gender) = request.gender {
            actor.gender = gender;
        }
        Ok(actor.clone())
    }

    pub fn delete_actor(&mut self, id: u64) -> Result<Actor, ApiError> {
        self.actors.remove(&id).ok_or_else(ApiError::unprocessable)
    }

    pub fn list_movies(&self, offset: usize, limit: usize) -> Vec<Movie> {
        self.movies.values().skip(offset).take(limit).cloned().collect()
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    pub fn movie(&self, id: u64) -> Option<Movie> {
        self.movies.get(&id).cloned()
    }

    pub fn create_movie(&mut self, request: NewMovie) -> Result<Movie, ApiError> {
        require_text(&request.title)?;

        self.last_movie_id += 1;
        let movie = Movie {
            id: self.last_movie_id,
            title: request.title,
            release_date: request.release_date,
        };
        self.movies.insert(movie.id, movie.clone());
        Ok(movie)
    }

    pub fn update_movie(&mut self, id: u64, request: MovieUpdate) -> Result<Movie, ApiError> {
        let movie = self
            .movies
            .get_mut(&id)
            .ok_or_else(ApiError::unprocessable)?;

        if let Some(title) = request.title {
            require_text(&title)?;
            movie.title = title;
        }
        if let Some(release_date) = request.release_date {
            movie.release_date = release_date;
        }
        Ok(movie.clone())
    }

    pub fn delete_movie(&mut self, id: u64) -> Result<Movie, ApiError> {
        self.movies.remove(&id).ok_or_else(ApiError::unprocessable)
    }
}
