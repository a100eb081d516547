use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use readings::account::{Credentials, Profile, Registration, Session};
use tokio::task::spawn_blocking;
use tracing::info;
use uuid::Uuid;

use super::{
    AuthUser, MIN_PASSWORD_LEN, decoy_hash, hash_password, normalize_email, verify_password,
};
use crate::{error::AppError, state::AppState, store::User};

fn invalid_login() -> AppError {
    AppError::Unauthorized("Invalid email or password".to_string())
}

pub async fn register_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(registration) = payload?;

    let name = registration.name.trim().to_string();
    let email = normalize_email(&registration.email);
    if name.is_empty() || email.is_empty() || registration.password.is_empty() {
        return Err(AppError::MissingFields);
    }
    if registration.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password = registration.password;
    let password_hash = spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let user = User {
        id: Uuid::new_v4().to_string(),
        name,
        email,
        password_hash,
        created_at: Utc::now(),
    };

    if !state.users.insert(&user).await? {
        return Err(AppError::Validation("User already exists".to_string()));
    }

    info!(user_id = %user.id, "Registered user");

    Ok((StatusCode::CREATED, Json(session(&state, user)?)))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(credentials) = payload?;

    let email = normalize_email(&credentials.email);
    if email.is_empty() || credentials.password.is_empty() {
        return Err(AppError::MissingFields);
    }

    let user = state.users.find_by_email(&email).await?;

    let password = credentials.password;
    let stored = user.as_ref().map(|user| user.password_hash.clone());
    let matches = spawn_blocking(move || match (stored, decoy_hash()) {
        (Some(hash), _) => verify_password(&password, &hash),
        (None, Some(decoy)) => verify_password(&password, decoy).map(|_| false),
        (None, None) => Ok(false),
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    let user = user.filter(|_| matches).ok_or_else(invalid_login)?;

    info!(user_id = %user.id, "User logged in");

    Ok(Json(session(&state, user)?))
}

pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .find_by_email(&auth.email)
        .await?
        .filter(|user| user.id == auth.id)
        .ok_or_else(|| AppError::Unauthorized("Not authorized, user not found".to_string()))?;

    Ok(Json(profile(user)))
}

fn profile(user: User) -> Profile {
    Profile {
        id: user.id,
        name: user.name,
        email: user.email,
    }
}

fn session(state: &AppState, user: User) -> Result<Session, AppError> {
    let token = state.tokens.issue(&user.id, &user.email)?;

    Ok(Session {
        profile: profile(user),
        token,
    })
}
