//! User validation

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID cannot be empty")]
    EmptyId,

    #[error("User ID cannot exceed {0} characters")]
    IdTooLong(usize),

    #[error("User ID can only contain alphanumeric characters and hyphens")]
    InvalidIdCharacters,

    #[error("User ID cannot start or end with a hyphen")]
    InvalidIdFormat,

    #[error("Email cannot be empty")]
    EmptyEmail,

    #[error("Email cannot exceed {0} characters")]
    EmailTooLong(usize),

    #[error("Email must contain a local part and a domain separated by '@'")]
    InvalidEmailFormat,
}

const MAX_USER_ID_LENGTH: usize = 50;
const MAX_EMAIL_LENGTH: usize = 254;

/// Validate a user ID
pub fn validate_user_id(id: &str) -> Result<(), UserValidationError> {
    if id.is_empty() {
        return Err(UserValidationError::EmptyId);
    }

    if id.len() > MAX_USER_ID_LENGTH {
        return Err(UserValidationError::IdTooLong(MAX_USER_ID_LENGTH));
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(UserValidationError::InvalidIdCharacters);
    }

    if id.starts_with('-') || id.ends_with('-') {
        return Err(UserValidationError::InvalidIdFormat);
    }

    Ok(())
}

/// Validate an email address
///
/// Structural check only; deliverability is the mail collaborator's problem.
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmptyEmail);
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(UserValidationError::EmailTooLong(MAX_EMAIL_LENGTH));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(UserValidationError::InvalidEmailFormat),
    }
}
