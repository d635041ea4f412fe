use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::{
    html::clean_html,
    timesince::{TimeDisplay, format_timesince},
};

/// Represents the 'posts' table joined with the author's username.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    /// Username of the author.
    pub author: String,
    pub slug: String,
    pub date_created: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
}

/// Post as returned by the API, with its display timestamp.
///
/// `content` is the text exactly as stored; `content_html` is the same text
/// passed through the markup whitelist, safe to embed in a page.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    #[serde(flatten)]
    pub post: Post,
    pub content_html: String,
    pub timesince: String,
}

impl PostResponse {
    pub fn new(post: Post, now: DateTime<Utc>, display: &TimeDisplay) -> Self {
        Self {
            content_html: clean_html(&post.content),
            timesince: format_timesince(post.date_created, now, display),
            post,
        }
    }
}

/// DTO for creating or editing a post.
#[derive(Debug, Deserialize, Validate)]
pub struct PostForm {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: String,
}

/// Query parameters for the paginated listings.
#[derive(Debug, Deserialize)]
pub struct PageParams {
    /// Page number, or `last`.
    pub page: Option<String>,
}
