// src/models/user.rs

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

use crate::error::{AppError, FieldError};

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern compiles"));

/// Minimum password length accepted at registration and password change.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique username.
    pub username: String,

    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub first_name: String,
    pub last_name: String,

    pub date_joined: chrono::DateTime<chrono::Utc>,
}

/// DTO for registration.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        length(
            min = 3,
            max = 150,
            message = "Username length must be between 3 and 150 characters."
        ),
        custom(function = validate_username_chars)
    )]
    pub username: String,

    #[serde(default)]
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 128, message = "This field is required."))]
    pub password1: String,

    #[validate(length(min = 1, max = 128, message = "This field is required."))]
    pub password2: String,
}

impl RegisterRequest {
    /// Field rules plus the cross-field password checks.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;
        check_new_password("password2", &self.username, &self.password1, &self.password2)
    }
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// DTO for changing the current user's password.
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordChangeRequest {
    #[validate(length(min = 1, max = 128, message = "This field is required."))]
    pub old_password: String,
    #[validate(length(min = 1, max = 128, message = "This field is required."))]
    pub new_password1: String,
    #[validate(length(min = 1, max = 128, message = "This field is required."))]
    pub new_password2: String,
}

/// DTO for the profile settings page.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileSettingsRequest {
    #[serde(default)]
    #[validate(length(max = 150, message = "First name is at most 150 characters."))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Last name is at most 150 characters."))]
    pub last_name: String,
}

fn validate_username_chars(username: &str) -> Result<(), ValidationError> {
    if !USERNAME_RE.is_match(username) {
        return Err(ValidationError::new("invalid_username").with_message(
            "Username may contain only letters, digits and @/./+/-/_ characters.".into(),
        ));
    }
    Ok(())
}

/// Password rules shared by registration and password change. Problems are
/// reported against `field`, the confirmation half of the pair.
pub fn check_new_password(
    field: &str,
    username: &str,
    password1: &str,
    password2: &str,
) -> Result<(), AppError> {
    if password1 != password2 {
        return Err(AppError::Validation(vec![FieldError::new(
            field,
            "The two password fields didn't match.",
        )]));
    }

    let mut errors = Vec::new();
    if password1.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(FieldError::new(
            field,
            format!(
                "This password is too short. It must contain at least {} characters.",
                MIN_PASSWORD_LENGTH
            ),
        ));
    }
    if password1.chars().all(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(field, "This password is entirely numeric."));
    }
    if !username.is_empty() && password1.to_lowercase().contains(&username.to_lowercase()) {
        errors.push(FieldError::new(
            field,
            "The password is too similar to the username.",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(err: AppError) -> Vec<String> {
        match err {
            AppError::Validation(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    fn register(username: &str, p1: &str, p2: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: None,
            password1: p1.to_string(),
            password2: p2.to_string(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(register("reader_1", "s3cure-pass", "s3cure-pass").check().is_ok());
    }

    #[test]
    fn mismatched_passwords() {
        let err = register("reader", "s3cure-pass", "s3cure-pas").check().unwrap_err();
        assert_eq!(fields(err), vec!["password2"]);
    }

    #[test]
    fn weak_passwords_collect_every_problem() {
        let err = check_new_password("password2", "bob", "1234", "1234").unwrap_err();
        assert_eq!(fields(err).len(), 2);

        let err = check_new_password("new_password2", "reader", "my-reader-pass", "my-reader-pass")
            .unwrap_err();
        assert_eq!(fields(err), vec!["new_password2"]);
    }

    #[test]
    fn bad_username_characters() {
        let err = register("no spaces", "s3cure-pass", "s3cure-pass").check().unwrap_err();
        assert_eq!(fields(err), vec!["username"]);
    }

    #[test]
    fn bad_email() {
        let mut req = register("reader", "s3cure-pass", "s3cure-pass");
        req.email = Some("not-an-email".to_string());
        assert_eq!(fields(req.check().unwrap_err()), vec!["email"]);
    }
}
