//! Recipient coverage checks
//!
//! The server cannot verify wrapped-key ciphertext, so correctness of key
//! distribution reduces to set arithmetic over recipient identifiers. Two
//! rules exist:
//!
//! - vault creation requires the supplied recipient set to EXACTLY match the
//!   live admin set. A missing admin would be locked out; an extra recipient
//!   means the client computed the set from stale membership data, and
//!   accepting it would hide broken coverage from detection.
//! - promotion only requires one-directional coverage: the supplied per-vault
//!   keys must include every vault the promoting admin can open, because the
//!   grant is scoped to a single new recipient.

use std::collections::BTreeSet;

use thiserror::Error;

use crate::domain::user::UserId;
use crate::domain::vault::{PromotionKeySet, VaultId};

/// Why a supplied key set fails its coverage check
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoverageError {
    #[error("missing recipients: {}", ids.join(", "))]
    MissingRecipients { ids: Vec<String> },

    #[error("unexpected recipients: {}", ids.join(", "))]
    UnexpectedRecipients { ids: Vec<String> },

    #[error("missing wrapped keys for vaults: {}", ids.join(", "))]
    MissingVaultKeys { ids: Vec<String> },
}

/// Require `supplied` to be exactly `required`, in both directions.
pub fn check_exact_recipients(
    supplied: &BTreeSet<UserId>,
    required: &BTreeSet<UserId>,
) -> Result<(), CoverageError> {
    let missing: Vec<String> = required
        .difference(supplied)
        .map(|id| id.as_str().to_string())
        .collect();
    if !missing.is_empty() {
        return Err(CoverageError::MissingRecipients { ids: missing });
    }

    let unexpected: Vec<String> = supplied
        .difference(required)
        .map(|id| id.as_str().to_string())
        .collect();
    if !unexpected.is_empty() {
        return Err(CoverageError::UnexpectedRecipients { ids: unexpected });
    }

    Ok(())
}

/// Require `keys` to supply a wrapped blob for every vault in `required`.
/// Extra entries are tolerated here; the caller only applies the required
/// subset.
pub fn check_covers_vaults(
    keys: &PromotionKeySet,
    required: &BTreeSet<VaultId>,
) -> Result<(), CoverageError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|id| !keys.contains(id))
        .map(|id| id.as_str().to_string())
        .collect();

    if !missing.is_empty() {
        return Err(CoverageError::MissingVaultKeys { ids: missing });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vault::WrappedKey;

    fn users(ids: &[&str]) -> BTreeSet<UserId> {
        ids.iter().map(|id| UserId::new(*id).unwrap()).collect()
    }

    #[test]
    fn test_exact_match_ok() {
        assert!(check_exact_recipients(&users(&["a", "b"]), &users(&["a", "b"])).is_ok());
    }

    #[test]
    fn test_exact_match_rejects_missing() {
        let err = check_exact_recipients(&users(&["a"]), &users(&["a", "b"])).unwrap_err();
        assert_eq!(
            err,
            CoverageError::MissingRecipients {
                ids: vec!["b".to_string()]
            }
        );
    }

    #[test]
    fn test_exact_match_rejects_extra() {
        let err = check_exact_recipients(&users(&["a", "b", "c"]), &users(&["a", "b"])).unwrap_err();
        assert_eq!(
            err,
            CoverageError::UnexpectedRecipients {
                ids: vec!["c".to_string()]
            }
        );
    }

    #[test]
    fn test_exact_match_empty_sets() {
        assert!(check_exact_recipients(&BTreeSet::new(), &BTreeSet::new()).is_ok());
    }

    #[test]
    fn test_vault_coverage_ok() {
        let v1 = VaultId::new("vault-1").unwrap();
        let v2 = VaultId::new("vault-2").unwrap();
        let keys = PromotionKeySet::new()
            .with_key(v1.clone(), WrappedKey::new(b"k1".to_vec()))
            .with_key(v2.clone(), WrappedKey::new(b"k2".to_vec()));

        let required = [v1, v2].into_iter().collect();
        assert!(check_covers_vaults(&keys, &required).is_ok());
    }

    #[test]
    fn test_vault_coverage_missing() {
        let v1 = VaultId::new("vault-1").unwrap();
        let v2 = VaultId::new("vault-2").unwrap();
        let keys = PromotionKeySet::new().with_key(v1.clone(), WrappedKey::new(b"k1".to_vec()));

        let required = [v1, v2].into_iter().collect();
        let err = check_covers_vaults(&keys, &required).unwrap_err();
        assert_eq!(
            err,
            CoverageError::MissingVaultKeys {
                ids: vec!["vault-2".to_string()]
            }
        );
    }

    #[test]
    fn test_vault_coverage_tolerates_extra() {
        let v1 = VaultId::new("vault-1").unwrap();
        let stray = VaultId::new("vault-9").unwrap();
        let keys = PromotionKeySet::new()
            .with_key(v1.clone(), WrappedKey::new(b"k1".to_vec()))
            .with_key(stray, WrappedKey::new(b"k9".to_vec()));

        let required = [v1].into_iter().collect();
        assert!(check_covers_vaults(&keys, &required).is_ok());
    }
}
