//! Vault domain module
//!
//! A vault is an encrypted secret container owned by exactly one team. Its
//! content key exists server-side only as per-recipient wrapped blobs; who
//! can open the vault is exactly the key set of its envelope.

pub mod coverage;
mod entity;
mod validation;

pub use entity::{PromotionKeySet, Vault, VaultId, VaultKeyPair, WrappedKey};
pub use validation::{validate_vault_id, validate_vault_name, VaultValidationError};
