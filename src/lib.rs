// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! usersms: user profiles and user-to-user ratings.
//!
//! This crate provides the backend API for updating and reading user
//! profiles (partial updates with owner/staff authorization) and for
//! rating users within sections.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{RatingStore, UserStore};
use services::{E164Formatter, JwtValidator, RatingService, UserManager};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: UserManager,
    pub ratings: RatingService,
}

impl AppState {
    /// Wire the services on top of the given stores, with JWT credentials
    /// and E.164 phone formatting taken from `config`.
    pub fn new(
        config: Config,
        user_store: Arc<dyn UserStore>,
        rating_store: Arc<dyn RatingStore>,
    ) -> Self {
        let credentials = Arc::new(JwtValidator::new(&config.jwt_signing_key));
        let phone = Arc::new(E164Formatter::new(&config.default_country_code));

        Self {
            users: UserManager::new(user_store, credentials.clone(), phone),
            ratings: RatingService::new(rating_store, credentials),
            config,
        }
    }
}
