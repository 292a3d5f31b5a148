//! Vault entity and key-envelope types
//!
//! All cryptographic material handled here is opaque: wrapped keys are
//! produced and consumed client-side, the server only checks which recipient
//! identifiers are present. Nothing in this module ever interprets blob
//! contents.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_vault_id, validate_vault_name, VaultValidationError};
use crate::domain::team::TeamId;
use crate::domain::user::UserId;

/// Vault identifier - alphanumeric + hyphens, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VaultId(String);

impl VaultId {
    /// Create a new VaultId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, VaultValidationError> {
        let id = id.into();
        validate_vault_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random vault ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VaultId {
    type Error = VaultValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<VaultId> for String {
    fn from(id: VaultId) -> Self {
        id.0
    }
}

impl std::fmt::Display for VaultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded.as_bytes()).map_err(serde::de::Error::custom)
    }
}

/// A content key encrypted for one specific recipient
///
/// The blob is client-produced ciphertext the server cannot verify. It is
/// immutable once stored and serialized as base64.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedKey(#[serde(with = "base64_bytes")] Vec<u8>);

impl WrappedKey {
    pub fn new(blob: impl Into<Vec<u8>>) -> Self {
        Self(blob.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Debug for WrappedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print ciphertext, only its size
        write!(f, "WrappedKey({} bytes)", self.0.len())
    }
}

/// A vault's content-key envelope
///
/// A salt/nonce byte string plus the per-recipient wrapped copies of the
/// vault's content key. Who can open a vault is defined extensionally by the
/// key set of `keys`; there is no separate grant table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultKeyPair {
    /// Opaque salt/nonce supplied by the client
    #[serde(with = "base64_bytes")]
    salt: Vec<u8>,
    /// Wrapped content key per recipient
    keys: BTreeMap<UserId, WrappedKey>,
}

impl VaultKeyPair {
    pub fn new(salt: impl Into<Vec<u8>>, keys: BTreeMap<UserId, WrappedKey>) -> Self {
        Self {
            salt: salt.into(),
            keys,
        }
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// The recipient identifiers this envelope carries a wrapped key for
    pub fn recipients(&self) -> BTreeSet<UserId> {
        self.keys.keys().cloned().collect()
    }

    /// Whether the user holds a wrapped copy of the content key
    pub fn contains(&self, user_id: &UserId) -> bool {
        self.keys.contains_key(user_id)
    }

    pub fn wrapped_key_for(&self, user_id: &UserId) -> Option<&WrappedKey> {
        self.keys.get(user_id)
    }

    /// Add a wrapped key for a new recipient. Additive only; existing
    /// recipients are never removed through this envelope.
    pub fn add_key(&mut self, user_id: UserId, key: WrappedKey) {
        self.keys.insert(user_id, key);
    }

    /// Structural sanity of the opaque material: non-empty salt, at least one
    /// recipient, no empty blobs. Says nothing about the ciphertext itself.
    pub fn is_well_formed(&self) -> bool {
        !self.salt.is_empty() && !self.keys.is_empty() && self.keys.values().all(|k| !k.is_empty())
    }
}

/// Per-vault wrapped keys for a single new recipient
///
/// Promotion grants one target access to every vault the promoting admin can
/// open, so the client supplies one wrapped blob per vault in scope rather
/// than a whole envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromotionKeySet {
    keys: BTreeMap<VaultId, WrappedKey>,
}

impl PromotionKeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, vault_id: VaultId, key: WrappedKey) {
        self.keys.insert(vault_id, key);
    }

    pub fn with_key(mut self, vault_id: VaultId, key: WrappedKey) -> Self {
        self.insert(vault_id, key);
        self
    }

    pub fn get(&self, vault_id: &VaultId) -> Option<&WrappedKey> {
        self.keys.get(vault_id)
    }

    pub fn contains(&self, vault_id: &VaultId) -> bool {
        self.keys.contains_key(vault_id)
    }

    /// The vault identifiers this set supplies a wrapped key for
    pub fn vault_ids(&self) -> BTreeSet<VaultId> {
        self.keys.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }
}

/// Vault entity - an encrypted secret container owned by exactly one team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vault {
    /// Unique identifier
    id: VaultId,
    /// Owning team
    team_id: TeamId,
    /// Display name
    name: String,
    /// Content-key envelope; exclusively owned by this vault
    key_pair: VaultKeyPair,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Vault {
    /// Create a new vault
    pub fn new(
        id: VaultId,
        team_id: TeamId,
        name: impl Into<String>,
        key_pair: VaultKeyPair,
    ) -> Result<Self, VaultValidationError> {
        let name = name.into();
        validate_vault_name(&name)?;
        let now = Utc::now();

        Ok(Self {
            id,
            team_id,
            name,
            key_pair,
            created_at: now,
            updated_at: now,
        })
    }

    // Getters

    pub fn id(&self) -> &VaultId {
        &self.id
    }

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_pair(&self) -> &VaultKeyPair {
        &self.key_pair
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Whether the user holds a wrapped key for this vault
    pub fn accessible_by(&self, user_id: &UserId) -> bool {
        self.key_pair.contains(user_id)
    }

    /// Add a wrapped key for a new recipient
    pub fn add_wrapped_key(&mut self, user_id: UserId, key: WrappedKey) {
        self.key_pair.add_key(user_id, key);
        self.updated_at = Utc::now();
    }
}
