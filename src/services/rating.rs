// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rating submission and queries for authenticated callers.

use chrono::Utc;
use std::sync::Arc;
use validator::Validate;

use crate::db::RatingStore;
use crate::error::{AppError, Result};
use crate::models::{AverageUser, Filter, NewRating, Rating};
use crate::services::credentials::CredentialValidator;

#[derive(Clone)]
pub struct RatingService {
    store: Arc<dyn RatingStore>,
    credentials: Arc<dyn CredentialValidator>,
}

/// Keep errors the caller can act on; wrap the rest as internal.
fn classify(context: &str, err: AppError) -> AppError {
    if err.is_not_found() || err.is_client_error() || err.is_conflict() {
        err
    } else {
        AppError::internal(context, err)
    }
}

impl RatingService {
    pub fn new(store: Arc<dyn RatingStore>, credentials: Arc<dyn CredentialValidator>) -> Self {
        Self { store, credentials }
    }

    /// Rate another user in a section as the credential's subject.
    ///
    /// Each rater may rate a given user once per section; a second attempt
    /// is a [`AppError::Conflict`].
    pub async fn rate(&self, token: &str, new: NewRating) -> Result<Rating> {
        let claims = self.credentials.validate(token)?;

        new.validate()
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if claims.sub == new.for_user_id {
            return Err(AppError::BadRequest(
                "users cannot rate themselves".to_string(),
            ));
        }

        let now = Utc::now();
        let rating = Rating {
            id: uuid::Uuid::new_v4().to_string(),
            for_section: new.for_section,
            for_user_id: new.for_user_id,
            by_user_id: claims.sub,
            rating: new.rating,
            comment: new.comment.unwrap_or_default(),
            created: now,
            last_updated: now,
        };

        self.store
            .save_rating(&rating)
            .await
            .map_err(|e| classify("save rating", e))?;
        Ok(rating)
    }

    pub async fn rating(
        &self,
        token: &str,
        by_user_id: &str,
        for_section: &str,
        for_user_id: &str,
    ) -> Result<Rating> {
        self.credentials.validate(token)?;
        self.store
            .rating_by_key(by_user_id, for_section, for_user_id)
            .await
            .map_err(|e| classify("fetch rating", e))
    }

    pub async fn ratings(&self, token: &str, filter: &Filter) -> Result<Vec<Rating>> {
        self.credentials.validate(token)?;
        self.store
            .ratings_by_filter(filter)
            .await
            .map_err(|e| classify("fetch ratings", e))
    }

    pub async fn average_user_ratings(
        &self,
        token: &str,
        offset: i64,
        count: i32,
    ) -> Result<Vec<AverageUser>> {
        self.credentials.validate(token)?;
        self.store
            .average_ratings_by_user(offset, count)
            .await
            .map_err(|e| classify("fetch average ratings", e))
    }
}
