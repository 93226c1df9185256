// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::Credential;
use crate::models::{OptionalField, User, UserUpdate};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/users/{user_id}", get(get_user).put(update_user))
}

/// Partial profile update. A key that is present means "update this field";
/// `null` or `""` clears it.
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: OptionalField<String>,
    #[serde(default)]
    pub gender: OptionalField<String>,
    #[serde(default)]
    pub avatar_url: OptionalField<String>,
    #[serde(default)]
    pub ice_phone: OptionalField<String>,
}

/// Profile response. Fields outside the caller's view are omitted.
#[derive(Serialize, Debug)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ice_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}

fn timestamp(value: DateTime<Utc>) -> Option<String> {
    (value != DateTime::<Utc>::default()).then(|| format_utc_rfc3339(value))
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            avatar_url: non_empty(user.avatar_url),
            gender: non_empty(user.gender),
            ice_phone: non_empty(user.ice_phone),
            created: timestamp(user.created),
            last_updated: timestamp(user.last_updated),
        }
    }
}

/// Create or partially update a profile.
async fn update_user(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    tracing::debug!(
        user_id = %user_id,
        name = body.name.is_updating,
        gender = body.gender.is_updating,
        avatar_url = body.avatar_url.is_updating,
        ice_phone = body.ice_phone.is_updating,
        "Updating user"
    );

    let update = UserUpdate {
        user_id,
        name: body.name,
        gender: body.gender,
        avatar_url: body.avatar_url,
        ice_phone: body.ice_phone,
        time: None,
    };

    let user = state.users.update(credential.as_str(), update).await?;
    Ok(Json(user.into()))
}

#[derive(Deserialize)]
struct UserQuery {
    /// Only return the profile if it changed after this instant (RFC3339).
    offset_update_date: Option<String>,
}

fn parse_offset_update_date(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    raw.map(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| {
                AppError::BadRequest(
                    "Invalid 'offset_update_date' parameter: must be RFC3339 datetime"
                        .to_string(),
                )
            })
    })
    .transpose()
}

/// Fetch a profile; without a credential only the public view is returned.
async fn get_user(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    Path(user_id): Path<String>,
    Query(params): Query<UserQuery>,
) -> Result<Json<UserResponse>> {
    let offset_update_date = parse_offset_update_date(params.offset_update_date.as_deref())?;

    let user = state
        .users
        .user(credential.as_str(), &user_id, offset_update_date)
        .await?;
    Ok(Json(user.into()))
}
