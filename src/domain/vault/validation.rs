//! Vault validation

use thiserror::Error;

/// Errors that can occur during vault validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum VaultValidationError {
    #[error("Vault ID cannot be empty")]
    EmptyId,

    #[error("Vault ID cannot exceed {0} characters")]
    IdTooLong(usize),

    #[error("Vault ID can only contain alphanumeric characters and hyphens")]
    InvalidIdCharacters,

    #[error("Vault ID cannot start or end with a hyphen")]
    InvalidIdFormat,

    #[error("Vault name cannot be empty")]
    EmptyName,

    #[error("Vault name cannot exceed {0} characters")]
    NameTooLong(usize),
}

const MAX_VAULT_ID_LENGTH: usize = 50;
const MAX_VAULT_NAME_LENGTH: usize = 100;

/// Validate a vault ID
pub fn validate_vault_id(id: &str) -> Result<(), VaultValidationError> {
    if id.is_empty() {
        return Err(VaultValidationError::EmptyId);
    }

    if id.len() > MAX_VAULT_ID_LENGTH {
        return Err(VaultValidationError::IdTooLong(MAX_VAULT_ID_LENGTH));
    }

    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(VaultValidationError::InvalidIdCharacters);
    }

    if id.starts_with('-') || id.ends_with('-') {
        return Err(VaultValidationError::InvalidIdFormat);
    }

    Ok(())
}

/// Validate a vault name
pub fn validate_vault_name(name: &str) -> Result<(), VaultValidationError> {
    if name.is_empty() {
        return Err(VaultValidationError::EmptyName);
    }

    if name.len() > MAX_VAULT_NAME_LENGTH {
        return Err(VaultValidationError::NameTooLong(MAX_VAULT_NAME_LENGTH));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_vault_id() {
        assert!(validate_vault_id("vault-1").is_ok());
        assert!(validate_vault_id("9f8e7d6c").is_ok());
    }

    #[test]
    fn test_invalid_vault_id() {
        assert!(validate_vault_id("").is_err());
        assert!(validate_vault_id("-vault").is_err());
        assert!(validate_vault_id("vault_1").is_err());
    }

    #[test]
    fn test_vault_name() {
        assert!(validate_vault_name("Shared passwords").is_ok());
        assert!(validate_vault_name("").is_err());
        assert!(validate_vault_name(&"n".repeat(101)).is_err());
    }
}
