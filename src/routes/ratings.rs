// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rating routes.

use crate::error::Result;
use crate::middleware::auth::Credential;
use crate::models::{AverageUser, Filter, NewRating, Rating};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ratings", get(list_ratings).post(create_rating))
        .route("/ratings/averages", get(average_ratings))
        .route(
            "/ratings/{by_user_id}/{for_section}/{for_user_id}",
            get(get_rating),
        )
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RatingsResponse {
    pub ratings: Vec<Rating>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AverageRatingsResponse {
    pub averages: Vec<AverageUser>,
}

/// Rate a user in a section as the authenticated caller.
async fn create_rating(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    Json(body): Json<NewRating>,
) -> Result<(StatusCode, Json<Rating>)> {
    let rating = state.ratings.rate(credential.as_str(), body).await?;

    tracing::info!(
        rating_id = %rating.id,
        for_section = %rating.for_section,
        for_user_id = %rating.for_user_id,
        "Rating created"
    );

    Ok((StatusCode::CREATED, Json(rating)))
}

/// List ratings matching the query filter.
async fn list_ratings(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    Query(filter): Query<Filter>,
) -> Result<Json<RatingsResponse>> {
    tracing::debug!(
        for_section = ?filter.for_section,
        for_user_id = ?filter.for_user_id,
        by_user_id = ?filter.by_user_id,
        offset = filter.offset,
        count = filter.count,
        "Fetching ratings"
    );

    let ratings = state.ratings.ratings(credential.as_str(), &filter).await?;
    Ok(Json(RatingsResponse { ratings }))
}

async fn get_rating(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    Path((by_user_id, for_section, for_user_id)): Path<(String, String, String)>,
) -> Result<Json<Rating>> {
    let rating = state
        .ratings
        .rating(credential.as_str(), &by_user_id, &for_section, &for_user_id)
        .await?;
    Ok(Json(rating))
}

#[derive(Deserialize)]
struct PageQuery {
    #[serde(default)]
    offset: i64,
    #[serde(default)]
    count: i32,
}

/// Mean rating and rater count per rated user.
async fn average_ratings(
    State(state): State<Arc<AppState>>,
    credential: Credential,
    Query(page): Query<PageQuery>,
) -> Result<Json<AverageRatingsResponse>> {
    let averages = state
        .ratings
        .average_user_ratings(credential.as_str(), page.offset, page.count)
        .await?;
    Ok(Json(AverageRatingsResponse { averages }))
}
