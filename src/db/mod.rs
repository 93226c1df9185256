// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer: storage traits and their Firestore / in-memory backends.

pub mod firestore;
pub mod memory;
pub mod query;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::{AverageUser, Filter, Rating, User, UserUpdate};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    pub const RATINGS: &str = "ratings";
}

/// Profile persistence.
///
/// Missing profiles are reported as [`AppError::NotFound`] so callers can
/// classify them with [`AppError::is_not_found`].
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert the profile if `update.user_id` is unknown, otherwise merge
    /// the updating fields into it.
    async fn upsert_user(&self, update: UserUpdate) -> Result<User, AppError>;

    /// Fetch a profile. With `offset_update_date`, a profile not updated
    /// strictly after that instant is reported as not found.
    async fn user_by_id(
        &self,
        id: &str,
        offset_update_date: Option<DateTime<Utc>>,
    ) -> Result<User, AppError>;
}

/// Rating relation.
#[async_trait]
pub trait RatingStore: Send + Sync {
    /// Insert a new rating. A rating with the same
    /// `(for_section, for_user_id, by_user_id)` yields [`AppError::Conflict`].
    async fn save_rating(&self, rating: &Rating) -> Result<(), AppError>;

    /// Exact match on the identity triple.
    async fn rating_by_key(
        &self,
        by_user_id: &str,
        for_section: &str,
        for_user_id: &str,
    ) -> Result<Rating, AppError>;

    /// Filtered page of ratings ordered by creation time then ID. An empty
    /// page is [`AppError::NotFound`].
    async fn ratings_by_filter(&self, filter: &Filter) -> Result<Vec<Rating>, AppError>;

    /// Per-ratee averages, paginated over the groups and ordered by user ID.
    /// An empty page is [`AppError::NotFound`].
    async fn average_ratings_by_user(
        &self,
        offset: i64,
        count: i32,
    ) -> Result<Vec<AverageUser>, AppError>;
}

/// Document ID for a rating, derived from its identity triple.
pub fn rating_key(for_section: &str, for_user_id: &str, by_user_id: &str) -> String {
    format!(
        "{}:{}:{}",
        urlencoding::encode(for_section),
        urlencoding::encode(for_user_id),
        urlencoding::encode(by_user_id)
    )
}

/// Document ID for a profile. Escaped so IDs containing `/` stay a single
/// path segment.
pub fn user_doc_id(user_id: &str) -> String {
    urlencoding::encode(user_id).into_owned()
}

pub(crate) fn user_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("user {} not found", id))
}

pub(crate) fn no_ratings_for_filter() -> AppError {
    AppError::NotFound("no rating found for filter".to_string())
}

pub(crate) fn no_averages_in_range() -> AppError {
    AppError::NotFound("no user ratings found in range".to_string())
}
