// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile updates and lookups with authorization and validation.

use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::middleware::auth::AccessLevel;
use crate::models::{User, UserUpdate, VALID_GENDERS};
use crate::services::credentials::CredentialValidator;
use crate::services::phone::PhoneFormatter;

/// Minimum access level to act on somebody else's profile.
pub const ACCESS_LEVEL_STAFF: AccessLevel = AccessLevel::Staff;

/// Authorizes, validates and persists profile changes.
///
/// Stateless apart from its collaborators; safe to share across requests.
#[derive(Clone)]
pub struct UserManager {
    db: Arc<dyn UserStore>,
    credentials: Arc<dyn CredentialValidator>,
    phone: Arc<dyn PhoneFormatter>,
}

impl UserManager {
    pub fn new(
        db: Arc<dyn UserStore>,
        credentials: Arc<dyn CredentialValidator>,
        phone: Arc<dyn PhoneFormatter>,
    ) -> Self {
        Self {
            db,
            credentials,
            phone,
        }
    }

    /// Apply a partial update to a profile, creating it if it does not exist.
    ///
    /// The caller must own the profile or hold staff access. A profile seen
    /// for the first time needs both `name` and `gender`. `ice_phone` is
    /// stored in its formatted form.
    pub async fn update(&self, token: &str, mut update: UserUpdate) -> Result<User> {
        self.credentials
            .validate_owner_or_access_level(token, &update.user_id, ACCESS_LEVEL_STAFF)?;

        self.validate_user_update(&mut update).await?;

        update.time = Some(Utc::now());
        self.db
            .upsert_user(update)
            .await
            .map_err(|e| AppError::internal("upsert user", e))
    }

    /// Fetch a profile.
    ///
    /// An empty `token` is allowed, but then only the public fields
    /// (`id`, `name`, `avatar_url`) are returned. A non-empty token must be
    /// valid. `offset_update_date` is handed to storage unchanged.
    pub async fn user(
        &self,
        token: &str,
        id: &str,
        offset_update_date: Option<DateTime<Utc>>,
    ) -> Result<User> {
        if !token.is_empty() {
            self.credentials.validate(token)?;
        }

        let user = self
            .db
            .user_by_id(id, offset_update_date)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    AppError::NotFound("user not found".to_string())
                } else {
                    AppError::internal("fetch user", e)
                }
            })?;

        if token.is_empty() {
            return Ok(user.into_public());
        }
        Ok(user)
    }

    /// Validate `update` against the stored profile, formatting the ICE
    /// phone number in place.
    async fn validate_user_update(&self, update: &mut UserUpdate) -> Result<()> {
        if update.user_id.is_empty() {
            return Err(AppError::BadRequest("user_id was empty".to_string()));
        }

        match self.db.user_by_id(&update.user_id, None).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                if !update.name.is_updating {
                    return Err(AppError::BadRequest(
                        "name must be provided during first time profile update".to_string(),
                    ));
                }
                if !update.gender.is_updating {
                    return Err(AppError::BadRequest(
                        "gender must be provided during first time profile update".to_string(),
                    ));
                }
            }
            Err(e) => return Err(AppError::internal("fetch user", e)),
        }

        if update.name.is_updating && update.name.new_value.is_empty() {
            return Err(AppError::BadRequest("name was empty".to_string()));
        }

        if update.ice_phone.is_updating && !update.ice_phone.new_value.is_empty() {
            update.ice_phone.new_value = self
                .phone
                .format_if_valid(&update.ice_phone.new_value)
                .map_err(|e| AppError::BadRequest(format!("invalid ice_phone: {}", e)))?;
        }

        if update.gender.is_updating && !VALID_GENDERS.contains(&update.gender.new_value.as_str())
        {
            return Err(AppError::BadRequest(format!(
                "invalid gender value, must be one of {:?}",
                VALID_GENDERS
            )));
        }

        if update.avatar_url.is_updating && !update.avatar_url.new_value.is_empty() {
            url::Url::parse(&update.avatar_url.new_value)
                .map_err(|e| AppError::BadRequest(format!("invalid avatar_url: {}", e)))?;
        }

        Ok(())
    }
}
