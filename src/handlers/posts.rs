use async_trait::async_trait;
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    handlers::{
        comments::list_for_post,
        ownership::{OwnedResource, require_owner},
    },
    models::{
        comment::{CommentView, comments_tree},
        post::{PageParams, Post, PostForm, PostResponse},
    },
    utils::{
        comment_tree::CommentNode,
        jwt::Claims,
        pagination::{PageResponse, Paginator},
        slug::slugify_title,
    },
};

const POST_SELECT: &str = r#"
    SELECT
        p.id, p.title, p.content, p.author_id, u.username AS author,
        p.slug, p.date_created, p.last_modified
    FROM posts p
    JOIN users u ON u.id = p.author_id
"#;

#[async_trait]
impl OwnedResource for Post {
    const KIND: &'static str = "Post";

    async fn find(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, AppError> {
        fetch_post(pool, slug).await
    }

    fn owner_id(&self) -> i64 {
        self.author_id
    }
}

pub(crate) async fn fetch_post(pool: &SqlitePool, slug: &str) -> Result<Option<Post>, AppError> {
    let post = sqlx::query_as::<_, Post>(&format!("{POST_SELECT} WHERE p.slug = ?1"))
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(post)
}

/// Which posts a listing shows.
#[derive(Debug, Clone, Copy)]
pub enum PostFilter {
    All,
    Author(i64),
}

impl PostFilter {
    fn author(self) -> Option<i64> {
        match self {
            PostFilter::All => None,
            PostFilter::Author(id) => Some(id),
        }
    }
}

/// One page of posts, newest first.
pub async fn list_page(
    pool: &SqlitePool,
    config: &Config,
    filter: PostFilter,
    page: Option<&str>,
) -> Result<PageResponse<PostResponse>, AppError> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE (?1 IS NULL OR author_id = ?1)")
            .bind(filter.author())
            .fetch_one(pool)
            .await?;

    let page = Paginator::new(count, config.paginate_by).page(page)?;

    let posts = sqlx::query_as::<_, Post>(&format!(
        "{POST_SELECT}
        WHERE (?1 IS NULL OR p.author_id = ?1)
        ORDER BY p.date_created DESC, p.id DESC
        LIMIT ?2 OFFSET ?3"
    ))
    .bind(filter.author())
    .bind(page.per_page)
    .bind(page.offset())
    .fetch_all(pool)
    .await
    .map_err(|e| {
        tracing::error!("Failed to list posts: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let now = Utc::now();
    let items = posts
        .into_iter()
        .map(|post| PostResponse::new(post, now, &config.time_display))
        .collect();

    Ok(PageResponse::new(items, page))
}

/// Feed of every author's posts.
pub async fn feed(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = list_page(&pool, &config, PostFilter::All, params.page.as_deref()).await?;
    Ok(Json(page))
}

/// Posts of a single user.
pub async fn user_posts(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Path(username): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let author_id: i64 = sqlx::query_scalar("SELECT id FROM users WHERE username = ?1")
        .bind(&username)
        .fetch_optional(&pool)
        .await?
        .ok_or(AppError::NotFound("User not found".to_string()))?;

    let page = list_page(
        &pool,
        &config,
        PostFilter::Author(author_id),
        params.page.as_deref(),
    )
    .await?;
    Ok(Json(page))
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: PostResponse,
    pub comments_tree: Vec<CommentNode<CommentView>>,
}

/// A post with its threaded comments.
pub async fn post_detail(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post = fetch_post(&pool, &slug)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    let comments = list_for_post(&pool, post.id, config.comment_order).await?;

    let now = Utc::now();
    let detail = PostDetail {
        comments_tree: comments_tree(comments, now, &config.time_display),
        post: PostResponse::new(post, now, &config.time_display),
    };

    Ok(Json(detail))
}

/// Trims the form and runs field validation.
fn clean_form(mut form: PostForm) -> Result<PostForm, AppError> {
    form.title = form.title.trim().to_string();
    form.content = form.content.trim().to_string();
    form.validate()?;
    Ok(form)
}

/// Maps title/slug uniqueness violations to a field error on `title`.
fn map_post_write_error(err: sqlx::Error) -> AppError {
    if is_unique_violation(&err, "posts.title") {
        AppError::field("title", "Post with this Title already exists.")
    } else if is_unique_violation(&err, "posts.slug") {
        AppError::field("title", "A post with a too similar title already exists.")
    } else {
        tracing::error!("Failed to write post: {:?}", err);
        AppError::InternalServerError(err.to_string())
    }
}

/// Create a new post owned by the caller.
pub async fn add_post(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PostForm>,
) -> Result<impl IntoResponse, AppError> {
    let form = clean_form(payload)?;
    let slug = slugify_title(&form.title)?;
    let author_id = claims.user_id()?;
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO posts (title, content, author_id, slug, date_created, last_modified)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)
        "#,
    )
    .bind(&form.title)
    .bind(&form.content)
    .bind(author_id)
    .bind(&slug)
    .bind(now)
    .execute(&pool)
    .await
    .map_err(map_post_write_error)?;

    let post = fetch_post(&pool, &slug)
        .await?
        .ok_or(AppError::InternalServerError("Post vanished after insert".to_string()))?;

    tracing::info!(post_id = post.id, slug = %post.slug, author_id, "Post created");

    Ok((
        StatusCode::CREATED,
        Json(PostResponse::new(post, now, &config.time_display)),
    ))
}

/// Edit title and content. The slug stays as it was at creation.
pub async fn update_post(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
    Json(payload): Json<PostForm>,
) -> Result<impl IntoResponse, AppError> {
    let post: Post = require_owner(&pool, &slug, &claims).await?;
    let form = clean_form(payload)?;
    let now = Utc::now();

    sqlx::query("UPDATE posts SET title = ?1, content = ?2, last_modified = ?3 WHERE id = ?4")
        .bind(&form.title)
        .bind(&form.content)
        .bind(now)
        .bind(post.id)
        .execute(&pool)
        .await
        .map_err(map_post_write_error)?;

    let post = fetch_post(&pool, &slug)
        .await?
        .ok_or(AppError::NotFound("Post not found".to_string()))?;

    Ok(Json(PostResponse::new(post, now, &config.time_display)))
}

/// Delete a post together with all of its comments.
pub async fn delete_post(
    State(pool): State<SqlitePool>,
    Extension(claims): Extension<Claims>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let post: Post = require_owner(&pool, &slug, &claims).await?;

    sqlx::query("DELETE FROM posts WHERE id = ?1")
        .bind(post.id)
        .execute(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to delete post: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

    tracing::info!(post_id = post.id, "Post deleted");

    Ok(StatusCode::NO_CONTENT)
}
