use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{error::AppError, utils::jwt::Claims};

/// A stored resource that only its author may change.
///
/// Edit and delete handlers describe *how* to find the resource and *who*
/// owns it; [`require_owner`] does the not-found / forbidden gating.
#[async_trait]
pub trait OwnedResource: Sized + Send {
    /// Name used in error messages, e.g. "Post".
    const KIND: &'static str;

    async fn find(pool: &SqlitePool, key: &str) -> Result<Option<Self>, AppError>;

    fn owner_id(&self) -> i64;
}

/// Loads `key` and checks that the caller owns it.
///
/// Unknown keys give 404, someone else's resource gives 403.
pub async fn require_owner<R: OwnedResource>(
    pool: &SqlitePool,
    key: &str,
    claims: &Claims,
) -> Result<R, AppError> {
    let resource = R::find(pool, key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", R::KIND)))?;

    let user_id = claims.user_id()?;
    if resource.owner_id() != user_id {
        tracing::info!(
            user_id,
            owner_id = resource.owner_id(),
            kind = R::KIND,
            "Rejected change by non-owner"
        );
        return Err(AppError::Forbidden(format!(
            "You are not the author of this {}",
            R::KIND.to_lowercase()
        )));
    }

    Ok(resource)
}
