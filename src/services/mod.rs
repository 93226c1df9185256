// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod credentials;
pub mod phone;
pub mod rating;
pub mod user;

pub use credentials::{AuthError, CredentialValidator, JwtValidator};
pub use phone::{E164Formatter, PhoneError, PhoneFormatter};
pub use rating::RatingService;
pub use user::UserManager;
