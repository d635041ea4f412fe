use axum::{Extension, Json, extract::State, response::IntoResponse};
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    error::AppError,
    handlers::auth::fetch_user,
    models::user::ProfileSettingsRequest,
    utils::jwt::Claims,
};

/// Current user's profile.
pub async fn get_settings(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = fetch_user(&pool, claims.user_id()?).await?;
    Ok(Json(user))
}

/// Sets first and last name.
pub async fn update_settings(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Json(mut payload): Json<ProfileSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.first_name = payload.first_name.trim().to_string();
    payload.last_name = payload.last_name.trim().to_string();
    payload.validate()?;

    let user_id = claims.user_id()?;
    sqlx::query("UPDATE users SET first_name = ?1, last_name = ?2 WHERE id = ?3")
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(user_id)
        .execute(&pool)
        .await?;

    let user = fetch_user(&pool, user_id).await?;
    Ok(Json(user))
}
