use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::{CommentOrder, Config},
    error::AppError,
    handlers::posts::fetch_post,
    models::comment::{Comment, CommentView, CreateCommentRequest},
    utils::{jwt::Claims, timesince::format_timesince},
};

const COMMENT_SELECT: &str = r#"
    SELECT
        c.id, c.post_id, c.author_id, u.username AS author, c.text,
        c.date_created, c.parent_comment_id AS parent_comment
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

/// All comments of a post in display order.
pub(crate) async fn list_for_post(
    pool: &SqlitePool,
    post_id: i64,
    order: CommentOrder,
) -> Result<Vec<Comment>, AppError> {
    let comments = sqlx::query_as::<_, Comment>(&format!(
        "{COMMENT_SELECT} WHERE c.post_id = ?1 ORDER BY {}",
        order.sql()
    ))
    .bind(post_id)
    .fetch_all(pool)
    .await?;
    Ok(comments)
}

/// Add a comment to a post, optionally as a reply to another comment on
/// the same post.
pub async fn create_comment(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
    Json(mut payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post = fetch_post(&pool, &slug)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    payload.text = payload.text.trim().to_string();
    payload.validate()?;
    let author_id = claims.user_id()?;

    if let Some(parent_id) = payload.parent_comment {
        let parent_post: Option<i64> =
            sqlx::query_scalar("SELECT post_id FROM comments WHERE id = ?1")
                .bind(parent_id)
                .fetch_optional(&pool)
                .await?;

        match parent_post {
            None => {
                return Err(AppError::field(
                    "parent_comment",
                    "Select a valid choice. That comment does not exist.",
                ));
            }
            Some(pid) if pid != post.id => {
                return Err(AppError::field(
                    "parent_comment",
                    "A reply must belong to the same post as its parent.",
                ));
            }
            Some(_) => {}
        }
    }

    let now = Utc::now();
    let comment_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO comments (post_id, author_id, text, date_created, parent_comment_id)
        VALUES (?1, ?2, ?3, ?4, ?5)
        RETURNING id
        "#,
    )
    .bind(post.id)
    .bind(author_id)
    .bind(&payload.text)
    .bind(now)
    .bind(payload.parent_comment)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to create comment: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let comment = sqlx::query_as::<_, Comment>(&format!("{COMMENT_SELECT} WHERE c.id = ?1"))
        .bind(comment_id)
        .fetch_one(&pool)
        .await?;

    tracing::info!(
        comment_id = comment.id,
        post_id = post.id,
        parent = ?comment.parent_comment,
        "Comment created"
    );

    let view = CommentView {
        timesince: format_timesince(comment.date_created, now, &config.time_display),
        comment,
    };

    Ok((StatusCode::CREATED, Json(view)))
}
