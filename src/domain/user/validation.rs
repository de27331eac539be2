//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*$").unwrap()
});

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("User ID exceeds maximum length of {0} characters")]
    IdTooLong(usize),

    #[error("User ID must start with a letter or number")]
    InvalidIdStart,

    #[error("User ID must end with a letter or number")]
    InvalidIdEnd,

    #[error("User ID contains invalid character: '{0}'. Only alphanumeric characters and hyphens are allowed")]
    InvalidIdCharacter(char),

    #[error("User ID cannot contain consecutive hyphens")]
    ConsecutiveHyphens,

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email exceeds maximum length of {0} characters")]
    EmailTooLong(usize),

    #[error("Email is not a valid address")]
    InvalidEmail,

    #[error("Password cannot be empty")]
    EmptyPassword,

    #[error("Password is too short. Minimum length is {0} characters")]
    PasswordTooShort(usize),

    #[error("Password exceeds maximum length of {0} characters")]
    PasswordTooLong(usize),
}

const MAX_USER_ID_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 100;
const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 60;

/// Validate a user ID
///
/// Rules:
/// - Cannot be empty
/// - Maximum 50 characters
/// - Only alphanumeric characters and hyphens
/// - Must start and end with alphanumeric
/// - No consecutive hyphens
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    if id.is_empty() {
        return Err(UserValidationError::EmptyId);
    }

    if id.len() > MAX_USER_ID_LENGTH {
        return Err(UserValidationError::IdTooLong(MAX_USER_ID_LENGTH));
    }

    let chars: Vec<char> = id.chars().collect();

    if !chars[0].is_ascii_alphanumeric() {
        return Err(UserValidationError::InvalidIdStart);
    }

    if !chars[chars.len() - 1].is_ascii_alphanumeric() {
        return Err(UserValidationError::InvalidIdEnd);
    }

    let mut prev_hyphen = false;

    for c in &chars {
        if *c == '-' {
            if prev_hyphen {
                return Err(UserValidationError::ConsecutiveHyphens);
            }
            prev_hyphen = true;
        } else if c.is_ascii_alphanumeric() {
            prev_hyphen = false;
        } else {
            return Err(UserValidationError::InvalidIdCharacter(*c));
        }
    }

    Ok(())
}

/// Trim and lower-case an email so lookups and uniqueness are case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate an email address (expects an already normalized value)
///
/// Rules:
/// - Cannot be empty
/// - Maximum 100 characters
/// - Must look like `local@domain`
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.chars().count() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    if !EMAIL_PATTERN.is_match(email) {
        return Err(UserValidationError::InvalidEmail);
    }

    Ok(())
}

/// Validate a password as presented by a caller
///
/// Rules:
/// - Cannot be empty or whitespace only
/// - Minimum 6 characters
/// - Maximum 60 characters
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.trim().is_empty() {
        return Err(UserValidationError::EmptyPassword);
    }

    let length = password.chars().count();

    if length < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    if length > MAX_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooLong(MAX_PASSWORD_LENGTH));
    }

    Ok(())
}
