// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::user::{
        LoginRequest, PasswordChangeRequest, RegisterRequest, User, check_new_password,
    },
    utils::{
        hash::{hash_password, verify_password},
        jwt::{Claims, sign_jwt},
    },
};

const USER_SELECT: &str =
    "SELECT id, username, email, password, first_name, last_name, date_joined FROM users";

pub(crate) async fn fetch_user(pool: &SqlitePool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))
}

/// Registers a new user and logs them in.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created with a token and the user object (excluding password).
pub async fn register(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.username = payload.username.trim().to_string();
    payload.email = payload
        .email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());
    payload.check()?;

    let hashed_password = hash_password(&payload.password1)?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, email, password, date_joined)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, username, email, password, first_name, last_name, date_joined
        "#,
    )
    .bind(&payload.username)
    .bind(payload.email.as_deref().unwrap_or(""))
    .bind(&hashed_password)
    .bind(Utc::now())
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e, "users.username") {
            AppError::field("username", "A user with that username already exists.")
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    let token = sign_jwt(
        user.id,
        &user.username,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": token,
            "type": "Bearer",
            "user": user,
        })),
    ))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE username = ?1"))
        .bind(payload.username.trim())
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Login DB error: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    // Same answer for unknown users and wrong passwords.
    let invalid = || AppError::AuthError("Please enter a correct username and password.".to_string());

    let user = user.ok_or_else(invalid)?;
    if !verify_password(&payload.password, &user.password)? {
        return Err(invalid());
    }

    let token = sign_jwt(
        user.id,
        &user.username,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
    })))
}

/// Changes the current user's password after checking the old one.
pub async fn change_password(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PasswordChangeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let user = fetch_user(&pool, claims.user_id()?).await?;

    if !verify_password(&payload.old_password, &user.password)? {
        return Err(AppError::field(
            "old_password",
            "Your old password was entered incorrectly. Please enter it again.",
        ));
    }
    check_new_password(
        "new_password2",
        &user.username,
        &payload.new_password1,
        &payload.new_password2,
    )?;

    let hashed = hash_password(&payload.new_password1)?;
    sqlx::query("UPDATE users SET password = ?1 WHERE id = ?2")
        .bind(hashed)
        .bind(user.id)
        .execute(&pool)
        .await?;

    tracing::info!(user_id = user.id, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}
