use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::{
    comment_tree::{CommentNode, Threaded, build_comment_tree},
    timesince::{TimeDisplay, format_timesince},
};

/// Represents the 'comments' table joined with the author's username.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author_id: i64,
    pub author: String,
    pub text: String,
    pub date_created: DateTime<Utc>,
    /// The comment this one replies to, `None` for top-level comments.
    pub parent_comment: Option<i64>,
}

impl Threaded for Comment {
    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.parent_comment
    }
}

/// Comment as shown in the reply tree.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: Comment,
    pub timesince: String,
}

impl Threaded for CommentView {
    fn id(&self) -> i64 {
        self.comment.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.comment.parent_comment
    }
}

/// Builds the display tree for one post's comments, already in display
/// order, stamping each with its relative creation time.
pub fn comments_tree(
    comments: Vec<Comment>,
    now: DateTime<Utc>,
    display: &TimeDisplay,
) -> Vec<CommentNode<CommentView>> {
    let views = comments
        .into_iter()
        .map(|comment| CommentView {
            timesince: format_timesince(comment.date_created, now, display),
            comment,
        })
        .collect();
    build_comment_tree(views)
}

/// DTO for creating a new comment.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(
        min = 1,
        max = 900,
        message = "Comment must be between 1 and 900 characters"
    ))]
    pub text: String,

    /// Optional: the ID of the comment being replied to.
    pub parent_comment: Option<i64>,
}
