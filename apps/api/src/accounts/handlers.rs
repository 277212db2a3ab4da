//! User registration and profile endpoints.
//!
//! Credentials never pass through this service; the auth gateway verifies
//! them and forwards the user id. These endpoints manage the profile record
//! that id points at.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::auth::Principal;
use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterUser {
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProfilePatch {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
}

/// POST /api/v1/users
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUser>,
) -> Result<(StatusCode, Json<UserRow>), AppError> {
    if req.username.trim().is_empty() {
        return Err(AppError::Validation("username cannot be empty".to_string()));
    }
    if req.email.trim().is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (username, email, full_name, phone_number, location, bio)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(&req.username)
    .bind(&req.email)
    .bind(&req.full_name)
    .bind(&req.phone_number)
    .bind(&req.location)
    .bind(&req.bio)
    .fetch_one(&state.db)
    .await
    .map_err(unique_violation_to_validation)?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users/me
pub async fn handle_get_profile(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<UserRow>, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(principal.0)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// PATCH /api/v1/users/me
pub async fn handle_update_profile(
    State(state): State<AppState>,
    principal: Principal,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<UserRow>, AppError> {
    let mut user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(principal.0)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(v) = patch.email {
        user.email = v;
    }
    if let Some(v) = patch.full_name {
        user.full_name = v;
    }
    if let Some(v) = patch.phone_number {
        user.phone_number = v;
    }
    if let Some(v) = patch.location {
        user.location = v;
    }
    if let Some(v) = patch.bio {
        user.bio = v;
    }
    if user.email.trim().is_empty() {
        return Err(AppError::Validation("email cannot be empty".to_string()));
    }

    let updated = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET email = $1, full_name = $2, phone_number = $3, location = $4,
            bio = $5, updated_at = now()
        WHERE id = $6
        RETURNING *
        "#,
    )
    .bind(&user.email)
    .bind(&user.full_name)
    .bind(&user.phone_number)
    .bind(&user.location)
    .bind(&user.bio)
    .bind(principal.0)
    .fetch_one(&state.db)
    .await
    .map_err(unique_violation_to_validation)?;

    Ok(Json(updated))
}

fn unique_violation_to_validation(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            AppError::Validation("username or email already registered".to_string())
        }
        _ => AppError::Database(e),
    }
}
