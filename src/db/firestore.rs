// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage, keyed by user ID)
//! - Ratings (keyed by the `(section, ratee, rater)` triple)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use firestore::errors::FirestoreError;
use firestore::{FirestoreConsistencySelector, FirestoreQueryDirection};
use serde::Deserialize;

use crate::db::query::{average_by_user, Pagination, Predicate};
use crate::db::{
    collections, no_averages_in_range, no_ratings_for_filter, rating_key, user_doc_id,
    user_not_found, RatingStore, UserStore,
};
use crate::error::AppError;
use crate::models::{AverageUser, Filter, Rating, User, UserUpdate};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        read_user(self.get_client()?, id).await
    }

    /// Load a page of ratings matching `predicate`, ordered by creation time
    /// then ID.
    async fn query_ratings(
        &self,
        predicate: &Predicate,
        page: Pagination,
    ) -> Result<Vec<Rating>, AppError> {
        let conditions = predicate.conditions().to_vec();

        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::RATINGS)
            .filter(move |q| {
                q.for_all(
                    conditions
                        .iter()
                        .map(|c| q.field(c.column.as_str()).eq(c.value.clone())),
                )
            })
            .order_by([
                ("created", FirestoreQueryDirection::Ascending),
                ("id", FirestoreQueryDirection::Ascending),
            ])
            .offset(page.offset)
            .limit(page.limit);

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Projection of a rating onto the fields averages need.
#[derive(Deserialize)]
struct RatingScore {
    for_user_id: String,
    rating: f32,
}

async fn read_user(client: &firestore::FirestoreDb, id: &str) -> Result<Option<User>, AppError> {
    client
        .fluent()
        .select()
        .by_id_in(collections::USERS)
        .obj()
        .one(&user_doc_id(id))
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

#[async_trait]
impl UserStore for FirestoreDb {
    /// Existing profiles are read and rewritten inside one transaction, so
    /// concurrent partial updates to different fields cannot overwrite each
    /// other. New profiles go through `insert`, so two concurrent first-time
    /// updates for the same ID cannot both create the document.
    async fn upsert_user(&self, update: UserUpdate) -> Result<User, AppError> {
        let now = update.time.unwrap_or_else(Utc::now);
        let client = self.get_client()?;

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        // Reads through this handle register the document with the transaction.
        let tx_client = client.clone_with_consistency_selector(
            FirestoreConsistencySelector::Transaction(transaction.transaction_id().clone()),
        );
        let existing = match read_user(&tx_client, &update.user_id).await {
            Ok(existing) => existing,
            Err(e) => {
                let _ = transaction.rollback().await;
                return Err(e);
            }
        };

        match existing {
            Some(mut user) => {
                user.apply(update, now);
                client
                    .fluent()
                    .update()
                    .in_col(collections::USERS)
                    .document_id(user_doc_id(&user.id))
                    .object(&user)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!("Failed to add user to transaction: {}", e))
                    })?;

                transaction.commit().await.map_err(|e| {
                    AppError::Database(format!("Transaction commit failed: {}", e))
                })?;

                tracing::debug!(user_id = %user.id, "Updated user");
                Ok(user)
            }
            None => {
                let _ = transaction.rollback().await;

                let user = User::from_update(update, now);
                let saved: User = client
                    .fluent()
                    .insert()
                    .into(collections::USERS)
                    .document_id(user_doc_id(&user.id))
                    .object(&user)
                    .execute()
                    .await
                    .map_err(|e| match e {
                        FirestoreError::DataConflictError(_) => AppError::Conflict(format!(
                            "user {} was created concurrently",
                            user.id
                        )),
                        other => AppError::Database(other.to_string()),
                    })?;
                tracing::info!(user_id = %saved.id, "Created user");
                Ok(saved)
            }
        }
    }

    async fn user_by_id(
        &self,
        id: &str,
        offset_update_date: Option<DateTime<Utc>>,
    ) -> Result<User, AppError> {
        let user = self.get_user(id).await?.ok_or_else(|| user_not_found(id))?;

        match offset_update_date {
            Some(offset) if user.last_updated <= offset => Err(user_not_found(id)),
            _ => Ok(user),
        }
    }
}

#[async_trait]
impl RatingStore for FirestoreDb {
    async fn save_rating(&self, rating: &Rating) -> Result<(), AppError> {
        let doc_id = rating_key(&rating.for_section, &rating.for_user_id, &rating.by_user_id);

        let _: Rating = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::RATINGS)
            .document_id(&doc_id)
            .object(rating)
            .execute()
            .await
            .map_err(|e| match e {
                FirestoreError::DataConflictError(_) => AppError::Conflict(format!(
                    "user {} already rated user {} in section {}",
                    rating.by_user_id, rating.for_user_id, rating.for_section
                )),
                other => AppError::Database(other.to_string()),
            })?;

        tracing::info!(
            rating_id = %rating.id,
            for_user_id = %rating.for_user_id,
            "Saved rating"
        );
        Ok(())
    }

    async fn rating_by_key(
        &self,
        by_user_id: &str,
        for_section: &str,
        for_user_id: &str,
    ) -> Result<Rating, AppError> {
        let rating: Option<Rating> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::RATINGS)
            .obj()
            .one(&rating_key(for_section, for_user_id, by_user_id))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        rating.ok_or_else(no_ratings_for_filter)
    }

    async fn ratings_by_filter(&self, filter: &Filter) -> Result<Vec<Rating>, AppError> {
        let pagination = Pagination::new(filter.offset, filter.count)?;
        let ratings = self
            .query_ratings(&Predicate::from_filter(filter), pagination)
            .await?;

        if ratings.is_empty() {
            return Err(no_ratings_for_filter());
        }
        Ok(ratings)
    }

    /// Firestore has no GROUP BY, so the groups are built here.
    ///
    /// Only `for_user_id` and `rating` are fetched, but every rating is still
    /// read on each call: cost grows linearly with the size of the collection.
    async fn average_ratings_by_user(
        &self,
        offset: i64,
        count: i32,
    ) -> Result<Vec<AverageUser>, AppError> {
        let pagination = Pagination::new(offset, count)?;

        let scores: Vec<RatingScore> = self
            .get_client()?
            .fluent()
            .select()
            .fields(["for_user_id", "rating"])
            .from(collections::RATINGS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let page = pagination.apply(average_by_user(
            scores.iter().map(|s| (s.for_user_id.as_str(), s.rating)),
        ));
        if page.is_empty() {
            return Err(no_averages_in_range());
        }
        Ok(page)
    }
}
