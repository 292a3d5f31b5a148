use thiserror::Error;

/// Core domain errors
///
/// Every operation of the team/vault core returns one of these kinds. All
/// variants are returned synchronously; `Conflict` and `Storage` are the
/// transient kinds a caller may retry with backoff, the rest signal a state
/// the caller has to resolve by changing its input (or, for `AlreadyInTeam`
/// and `AlreadyInvited`, by using a different operation).
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Already in team: {message}")]
    AlreadyInTeam { message: String },

    #[error("Already invited: {message}")]
    AlreadyInvited { message: String },

    #[error("Invalid keys: {message}")]
    InvalidKeys { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Notification error: {message}")]
    Notification { message: String },
}

impl DomainError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn already_in_team(message: impl Into<String>) -> Self {
        Self::AlreadyInTeam {
            message: message.into(),
        }
    }

    pub fn already_invited(message: impl Into<String>) -> Self {
        Self::AlreadyInvited {
            message: message.into(),
        }
    }

    pub fn invalid_keys(message: impl Into<String>) -> Self {
        Self::InvalidKeys {
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification {
            message: message.into(),
        }
    }

    /// True for the transient kinds a caller may retry without changing input
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Conflict { .. } | Self::Storage { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_error() {
        let error = DomainError::not_found("Team 'test-id' not found");
        assert_eq!(error.to_string(), "Not found: Team 'test-id' not found");
    }

    #[test]
    fn test_invalid_keys_error() {
        let error = DomainError::invalid_keys("missing recipients: bob");
        assert_eq!(error.to_string(), "Invalid keys: missing recipients: bob");
    }

    #[test]
    fn test_unauthorized_error() {
        let error = DomainError::unauthorized("caller is not an admin");
        assert_eq!(error.to_string(), "Unauthorized: caller is not an admin");
    }

    #[test]
    fn test_transient_kinds() {
        assert!(DomainError::conflict("snapshot is stale").is_transient());
        assert!(DomainError::storage("connection lost").is_transient());
        assert!(!DomainError::already_in_team("bob").is_transient());
        assert!(!DomainError::invalid_keys("missing").is_transient());
    }
}
