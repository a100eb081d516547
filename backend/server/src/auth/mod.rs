//! # Auth
//!
//! Accounts, password hashing and bearer tokens.
//!
//! - Passwords are Argon2 PHC strings, hashed on the blocking pool
//! - Tokens are HS256 JWTs carrying the user id and email
//! - Credentials travel with each request in `Authorization: Bearer <token>`;
//!   nothing about the caller is remembered between requests
mod password;
mod routes;
mod token;

pub use password::{decoy_hash, hash_password, verify_password};
pub use routes::{login_handler, me_handler, register_handler};
pub use token::{Claims, TokenIssuer};

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, state::AppState};

pub const MIN_PASSWORD_LEN: usize = 6;

/// The caller behind a valid bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| AppError::Unauthorized("Not authorized, no token".to_string()))?;

        let claims = state.tokens.validate(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected bearer token");
            AppError::Unauthorized("Not authorized, token failed".to_string())
        })?;

        Ok(Self {
            id: claims.sub,
            email: claims.email,
        })
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
