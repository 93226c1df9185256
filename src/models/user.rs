// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model and the partial-update request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::time_utils::sortable_rfc3339;

/// Closed set of accepted gender values.
pub const VALID_GENDERS: [&str; 3] = ["MALE", "FEMALE", "OTHER"];

/// Update instruction for a single profile attribute.
///
/// `is_updating == false` leaves the stored value untouched. `is_updating`
/// with an empty `new_value` is an explicit clear.
///
/// When deserialized as a struct field with `#[serde(default)]`, an absent
/// key yields "not updating" and a present key (including `null`, read as
/// the empty value) yields "updating".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionalField<T> {
    pub is_updating: bool,
    pub new_value: T,
}

impl<T> OptionalField<T> {
    /// An update instruction setting the field to `value`.
    pub fn set(value: T) -> Self {
        Self {
            is_updating: true,
            new_value: value,
        }
    }

    /// Apply the instruction on top of `current`.
    pub fn apply(self, current: T) -> T {
        if self.is_updating {
            self.new_value
        } else {
            current
        }
    }
}

impl<T: Default> OptionalField<T> {
    /// An update instruction clearing the field.
    pub fn clear() -> Self {
        Self::set(T::default())
    }
}

impl<'de, T> Deserialize<'de> for OptionalField<T>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<T>::deserialize(deserializer)?;
        Ok(Self::set(value.unwrap_or_default()))
    }
}

/// A requested mutation of a user profile (not a full snapshot).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserUpdate {
    pub user_id: String,
    pub name: OptionalField<String>,
    pub gender: OptionalField<String>,
    pub avatar_url: OptionalField<String>,
    pub ice_phone: OptionalField<String>,
    /// Server-assigned time of the update.
    pub time: Option<DateTime<Utc>>,
}

impl UserUpdate {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            ..Default::default()
        }
    }
}

/// User profile as persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// User ID (also used as document ID)
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub gender: String,
    /// In-case-of-emergency phone number, E.164 formatted
    #[serde(default)]
    pub ice_phone: String,
    #[serde(with = "sortable_rfc3339")]
    pub created: DateTime<Utc>,
    #[serde(with = "sortable_rfc3339")]
    pub last_updated: DateTime<Utc>,
}

impl User {
    /// Build a fresh profile from a first-time update.
    pub fn from_update(update: UserUpdate, now: DateTime<Utc>) -> Self {
        let mut user = Self {
            id: update.user_id.clone(),
            created: now,
            ..Default::default()
        };
        user.apply(update, now);
        user
    }

    /// Merge `update` into this profile and bump `last_updated`.
    pub fn apply(&mut self, update: UserUpdate, now: DateTime<Utc>) {
        self.name = update.name.apply(std::mem::take(&mut self.name));
        self.gender = update.gender.apply(std::mem::take(&mut self.gender));
        self.avatar_url = update.avatar_url.apply(std::mem::take(&mut self.avatar_url));
        self.ice_phone = update.ice_phone.apply(std::mem::take(&mut self.ice_phone));
        self.last_updated = now;
    }

    /// Restrict to the fields visible without authentication.
    pub fn into_public(self) -> Self {
        Self {
            id: self.id,
            name: self.name,
            avatar_url: self.avatar_url,
            ..Default::default()
        }
    }
}
