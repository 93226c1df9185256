// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for local development and tests.
//!
//! Mirrors the Firestore backend's semantics: merge-on-upsert profiles,
//! insert-or-fail ratings keyed by their identity triple, and the shared
//! ordering/pagination rules from [`crate::db::query`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

use crate::db::query::{average_by_user, sort_ratings, Pagination, Predicate};
use crate::db::{
    no_averages_in_range, no_ratings_for_filter, rating_key, user_not_found, RatingStore,
    UserStore,
};
use crate::error::AppError;
use crate::models::{AverageUser, Filter, Rating, User, UserUpdate};

/// Shared in-memory tables. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<DashMap<String, User>>,
    ratings: Arc<DashMap<String, Rating>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn matching_ratings(&self, predicate: &Predicate) -> Vec<Rating> {
        let mut ratings: Vec<Rating> = self
            .ratings
            .iter()
            .filter(|entry| predicate.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        sort_ratings(&mut ratings);
        ratings
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn upsert_user(&self, update: UserUpdate) -> Result<User, AppError> {
        let now = update.time.unwrap_or_else(Utc::now);

        let user = match self.users.entry(update.user_id.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().apply(update, now);
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry.insert(User::from_update(update, now)).value().clone(),
        };

        tracing::debug!(user_id = %user.id, "Upserted user");
        Ok(user)
    }

    async fn user_by_id(
        &self,
        id: &str,
        offset_update_date: Option<DateTime<Utc>>,
    ) -> Result<User, AppError> {
        let user = self
            .users
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| user_not_found(id))?;

        match offset_update_date {
            Some(offset) if user.last_updated <= offset => Err(user_not_found(id)),
            _ => Ok(user),
        }
    }
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn save_rating(&self, rating: &Rating) -> Result<(), AppError> {
        let key = rating_key(&rating.for_section, &rating.for_user_id, &rating.by_user_id);

        match self.ratings.entry(key) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!(
                "user {} already rated user {} in section {}",
                rating.by_user_id, rating.for_user_id, rating.for_section
            ))),
            Entry::Vacant(entry) => {
                entry.insert(rating.clone());
                tracing::debug!(rating_id = %rating.id, "Saved rating");
                Ok(())
            }
        }
    }

    async fn rating_by_key(
        &self,
        by_user_id: &str,
        for_section: &str,
        for_user_id: &str,
    ) -> Result<Rating, AppError> {
        self.ratings
            .get(&rating_key(for_section, for_user_id, by_user_id))
            .map(|entry| entry.value().clone())
            .ok_or_else(no_ratings_for_filter)
    }

    async fn ratings_by_filter(&self, filter: &Filter) -> Result<Vec<Rating>, AppError> {
        let pagination = Pagination::new(filter.offset, filter.count)?;
        let predicate = Predicate::from_filter(filter);

        let page = pagination.apply(self.matching_ratings(&predicate));
        if page.is_empty() {
            return Err(no_ratings_for_filter());
        }
        Ok(page)
    }

    async fn average_ratings_by_user(
        &self,
        offset: i64,
        count: i32,
    ) -> Result<Vec<AverageUser>, AppError> {
        let pagination = Pagination::new(offset, count)?;
        let all = self.matching_ratings(&Predicate::new());

        let page = pagination.apply(average_by_user(
            all.iter().map(|r| (r.for_user_id.as_str(), r.rating)),
        ));
        if page.is_empty() {
            return Err(no_averages_in_range());
        }
        Ok(page)
    }
}
