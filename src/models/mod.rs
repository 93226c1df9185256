// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod rating;
pub mod user;

pub use rating::{AverageUser, Filter, NewRating, Rating};
pub use user::{OptionalField, User, UserUpdate, VALID_GENDERS};
