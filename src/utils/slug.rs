use crate::error::AppError;

/// Builds the URL slug for a post title.
///
/// Non-Latin scripts are transliterated first, so `"Привет, мир!"` becomes
/// `"privet-mir"`. A title that leaves nothing URL-safe behind is rejected
/// as a field error on `title`.
pub fn slugify_title(title: &str) -> Result<String, AppError> {
    let slug = ::slug::slugify(title);
    if slug.is_empty() {
        return Err(AppError::field(
            "title",
            "Title must contain at least one letter or digit",
        ));
    }
    Ok(slug)
}
