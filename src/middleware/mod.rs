// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request extraction helpers (credentials).

pub mod auth;

pub use auth::{create_jwt, AccessLevel, Claims, Credential};
