//! Field validators for user input.
//!
//! Every error names the offending field so it can be reported as-is.

use thiserror::Error;

pub const RESERVED_USERNAME: &str = "me";

const USERNAME_MAX: usize = 150;
const EMAIL_MAX: usize = 254;
const PERSON_NAME_MAX: usize = 150;
const SLUG_MAX: usize = 50;
pub const NAME_MAX: usize = 200;
pub const SCORE_RANGE: std::ops::RangeInclusive<i32> = 1..=10;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub fn validate_username(username: &str) -> Result<(), FieldError> {
    if username.is_empty() {
        return Err(FieldError::new("username", "This field may not be blank"));
    }

    if username.chars().count() > USERNAME_MAX {
        return Err(FieldError::new(
            "username",
            format!("Must be {USERNAME_MAX} characters or less"),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '.' | '@' | '+' | '-' | '_'))
    {
        return Err(FieldError::new(
            "username",
            "Can only contain letters, digits and @/./+/-/_",
        ));
    }

    if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
        return Err(FieldError::new("username", "Username 'me' is not valid"));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.is_empty() {
        return Err(FieldError::new("email", "This field may not be blank"));
    }

    if email.len() > EMAIL_MAX {
        return Err(FieldError::new(
            "email",
            format!("Must be {EMAIL_MAX} characters or less"),
        ));
    }

    email
        .parse::<lettre::Address>()
        .map(|_| ())
        .map_err(|_| FieldError::new("email", "Enter a valid email address"))
}

pub fn validate_person_name(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.chars().count() > PERSON_NAME_MAX {
        return Err(FieldError::new(
            field,
            format!("Must be {PERSON_NAME_MAX} characters or less"),
        ));
    }
    Ok(())
}

pub fn validate_slug(slug: &str) -> Result<(), FieldError> {
    if slug.is_empty() {
        return Err(FieldError::new("slug", "This field may not be blank"));
    }

    if slug.len() > SLUG_MAX {
        return Err(FieldError::new(
            "slug",
            format!("Must be {SLUG_MAX} characters or less"),
        ));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(FieldError::new(
            "slug",
            "Can only contain letters, numbers, hyphens and underscores",
        ));
    }

    Ok(())
}

/// Display names of categories, genres and titles.
pub fn validate_name(value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new("name", "This field may not be blank"));
    }

    if value.chars().count() > NAME_MAX {
        return Err(FieldError::new(
            "name",
            format!("Must be {NAME_MAX} characters or less"),
        ));
    }

    Ok(())
}

pub fn validate_year(year: i32, current_year: i32) -> Result<(), FieldError> {
    if year > current_year {
        return Err(FieldError::new(
            "year",
            format!("Year {year} is in the future (current year is {current_year})"),
        ));
    }
    Ok(())
}

pub fn validate_score(score: i32) -> Result<(), FieldError> {
    if !SCORE_RANGE.contains(&score) {
        return Err(FieldError::new(
            "score",
            format!(
                "Must be between {} and {}",
                SCORE_RANGE.start(),
                SCORE_RANGE.end()
            ),
        ));
    }
    Ok(())
}

pub fn validate_text(text: &str) -> Result<(), FieldError> {
    if text.trim().is_empty() {
        return Err(FieldError::new("text", "This field may not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("reviewer").is_ok());
        assert!(validate_username("first.last+tag@site").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("a".repeat(151).as_str()).is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
    }

    #[test]
    fn test_reserved_username_any_case() {
        for name in ["me", "Me", "mE", "ME"] {
            let err = validate_username(name).unwrap_err();
            assert_eq!(err.field, "username");
        }
        assert!(validate_username("meme").is_ok());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("reader@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(250))).is_err());
    }

    #[test]
    fn test_validate_slug() {
        assert!(validate_slug("sci-fi_2").is_ok());
        assert!(validate_slug("").is_err());
        assert!(validate_slug("has space").is_err());
        assert!(validate_slug("кино").is_err());
        assert!(validate_slug("a".repeat(51).as_str()).is_err());
    }

    #[test]
    fn test_validate_year() {
        assert!(validate_year(1965, 2025).is_ok());
        assert!(validate_year(2025, 2025).is_ok());
        assert!(validate_year(2026, 2025).is_err());
        assert!(validate_year(-500, 2025).is_ok());
    }

    #[test]
    fn test_validate_score_bounds() {
        assert!(validate_score(1).is_ok());
        assert!(validate_score(10).is_ok());
        assert_eq!(validate_score(0).unwrap_err().field, "score");
        assert!(validate_score(11).is_err());
    }

    #[test]
    fn test_validate_name_and_text() {
        assert!(validate_name("Dune").is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name("a".repeat(201).as_str()).is_err());
        assert!(validate_text("Great book").is_ok());
        assert!(validate_text("").is_err());
    }
}
