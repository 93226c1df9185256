// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage-agnostic query building for the rating relation.
//!
//! A [`Filter`] becomes a list of `(column, value)` equality constraints that
//! each backend renders in its own dialect, plus a normalized [`Pagination`].

use std::collections::BTreeMap;

use crate::error::AppError;
use crate::models::{AverageUser, Filter, Rating};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Constrainable columns of the rating relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingColumn {
    ForSection,
    ForUserId,
    ByUserId,
}

impl RatingColumn {
    /// Stored field name.
    pub fn as_str(self) -> &'static str {
        match self {
            RatingColumn::ForSection => "for_section",
            RatingColumn::ForUserId => "for_user_id",
            RatingColumn::ByUserId => "by_user_id",
        }
    }

    fn value_of(self, rating: &Rating) -> &str {
        match self {
            RatingColumn::ForSection => &rating.for_section,
            RatingColumn::ForUserId => &rating.for_user_id,
            RatingColumn::ByUserId => &rating.by_user_id,
        }
    }
}

/// One equality constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub column: RatingColumn,
    pub value: String,
}

/// Conjunction of equality constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    conditions: Vec<Condition>,
}

impl Predicate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = value` if `value` is populated. Empty strings impose
    /// no constraint.
    #[must_use]
    pub fn and_eq(mut self, column: RatingColumn, value: Option<&str>) -> Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.conditions.push(Condition {
                column,
                value: value.to_string(),
            });
        }
        self
    }

    pub fn from_filter(filter: &Filter) -> Self {
        Self::new()
            .and_eq(RatingColumn::ForSection, filter.for_section.as_deref())
            .and_eq(RatingColumn::ForUserId, filter.for_user_id.as_deref())
            .and_eq(RatingColumn::ByUserId, filter.by_user_id.as_deref())
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluate against a decoded row.
    pub fn matches(&self, rating: &Rating) -> bool {
        self.conditions
            .iter()
            .all(|c| c.column.value_of(rating) == c.value)
    }
}

/// Normalized offset/limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
}

impl Pagination {
    /// Validate raw offset/count. A zero count selects the default page size;
    /// counts above [`MAX_PAGE_SIZE`] are capped.
    pub fn new(offset: i64, count: i32) -> Result<Self, AppError> {
        let offset = u32::try_from(offset).map_err(|_| {
            AppError::BadRequest(format!("offset must be between 0 and {}", u32::MAX))
        })?;
        let count = u32::try_from(count)
            .map_err(|_| AppError::BadRequest("count must not be negative".to_string()))?;

        let limit = match count {
            0 => DEFAULT_PAGE_SIZE,
            n => n.min(MAX_PAGE_SIZE),
        };

        Ok(Self { offset, limit })
    }

    /// Apply to an already ordered sequence.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// Deterministic order for rating pages: creation time, then ID.
pub fn sort_ratings(ratings: &mut [Rating]) {
    ratings.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
}

/// Group `(ratee, rating)` pairs by ratee and compute mean rating and rater
/// count, ordered by ratee ID.
pub fn average_by_user<'a>(scores: impl IntoIterator<Item = (&'a str, f32)>) -> Vec<AverageUser> {
    let mut groups: BTreeMap<&str, (f64, u32)> = BTreeMap::new();
    for (user_id, rating) in scores {
        let entry = groups.entry(user_id).or_default();
        entry.0 += f64::from(rating);
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(user_id, (sum, count))| AverageUser {
            user_id: user_id.to_string(),
            rating: sum / f64::from(count),
            num_raters: count,
        })
        .collect()
}
