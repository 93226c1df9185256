// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential verification.
//!
//! Failures are split into "not authenticated" and "authenticated but not
//! allowed" so callers can pick 401 vs 403 without looking at messages.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

use crate::error::AppError;
use crate::middleware::auth::{AccessLevel, Claims};

/// Credential verification failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Missing, malformed, expired or wrongly signed credential.
    #[error("invalid credential: {0}")]
    Unauthorized(String),

    /// Valid credential without enough privilege for the target.
    #[error("insufficient privilege: {0}")]
    Forbidden(String),
}

impl AuthError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthError::Unauthorized(_))
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthError::Forbidden(_))
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthorized(msg) => AppError::Unauthorized(msg),
            AuthError::Forbidden(msg) => AppError::Forbidden(msg),
        }
    }
}

/// Verifies caller credentials.
pub trait CredentialValidator: Send + Sync {
    /// Any valid credential passes.
    fn validate(&self, token: &str) -> Result<Claims, AuthError>;

    /// Passes if the credential's subject is `owner_id` or its access level
    /// is at least `min_level`.
    fn validate_owner_or_access_level(
        &self,
        token: &str,
        owner_id: &str,
        min_level: AccessLevel,
    ) -> Result<Claims, AuthError> {
        let claims = self.validate(token)?;
        if claims.sub == owner_id || claims.acl >= min_level {
            return Ok(claims);
        }
        Err(AuthError::Forbidden(format!(
            "subject is not {} and has no {:?} access",
            owner_id, min_level
        )))
    }
}

/// HS256 JWT verifier.
pub struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(signing_key: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(signing_key),
            validation: Validation::new(Algorithm::HS256),
        }
    }
}

impl CredentialValidator for JwtValidator {
    fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        if token.is_empty() {
            return Err(AuthError::Unauthorized("no credential provided".to_string()));
        }

        let data = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| AuthError::Unauthorized(e.to_string()))?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::Unauthorized("credential has no subject".to_string()));
        }
        Ok(data.claims)
    }
}
