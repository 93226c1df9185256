// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ratings of one user by another within a section.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::time_utils::sortable_rfc3339;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// A stored rating.
///
/// `(for_section, for_user_id, by_user_id)` identifies at most one rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Rating {
    pub id: String,
    pub for_section: String,
    /// Ratee
    pub for_user_id: String,
    /// Rater
    pub by_user_id: String,
    pub rating: f32,
    /// Optional comment; a missing or null value decodes as empty.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub comment: String,
    #[serde(with = "sortable_rfc3339")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created: DateTime<Utc>,
    #[serde(with = "sortable_rfc3339")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub last_updated: DateTime<Utc>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A rating submitted by a caller; the rater comes from the credential.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewRating {
    #[validate(length(min = 1, message = "for_section is required"))]
    pub for_section: String,
    #[validate(length(min = 1, message = "for_user_id is required"))]
    pub for_user_id: String,
    #[validate(range(min = 1.0, max = 5.0, message = "rating must be between 1 and 5"))]
    pub rating: f32,
    #[serde(default)]
    #[validate(length(max = 1000, message = "comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

/// Rating query filter. Every populated field narrows the result (AND).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Filter {
    #[serde(default)]
    pub for_section: Option<String>,
    #[serde(default)]
    pub for_user_id: Option<String>,
    #[serde(default)]
    pub by_user_id: Option<String>,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub count: i32,
}

/// Mean rating and rater count for one ratee. Always computed, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AverageUser {
    pub user_id: String,
    pub rating: f64,
    pub num_raters: u32,
}
