//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_email, validate_user_id, UserValidationError};

/// User identifier - alphanumeric + hyphens, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User account entity
///
/// Accounts are created by registration, which lives outside this core; the
/// team/vault engine only ever resolves and reads them. Credential material
/// is deliberately absent from this model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    id: UserId,
    /// Email address, unique across the system
    email: String,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user
    pub fn new(id: UserId, email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        validate_email(&email)?;
        let now = Utc::now();

        Ok(Self {
            id,
            email,
            created_at: now,
            updated_at: now,
        })
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_valid() {
        let id = UserId::new("alice").unwrap();
        assert_eq!(id.as_str(), "alice");
    }

    #[test]
    fn test_user_id_invalid() {
        assert!(UserId::new("").is_err());
        assert!(UserId::new("-alice").is_err());
        assert!(UserId::new("al ice").is_err());
    }

    #[test]
    fn test_user_creation() {
        let user = User::new(UserId::new("alice").unwrap(), "alice@example.com").unwrap();
        assert_eq!(user.id().as_str(), "alice");
        assert_eq!(user.email(), "alice@example.com");
    }

    #[test]
    fn test_user_invalid_email() {
        assert!(User::new(UserId::new("alice").unwrap(), "not-an-email").is_err());
    }
}
