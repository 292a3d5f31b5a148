//! Transactional persistence contract for the team aggregate
//!
//! Every mutating team operation follows the same shape: read one consistent
//! `TeamSnapshot`, validate authorization and key coverage against it, then
//! `commit` a write set conditioned on the snapshot's version. A commit whose
//! version no longer matches fails with `DomainError::Conflict` and applies
//! nothing, so no operation can act on a stale admin or vault set.

use std::collections::BTreeSet;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::entity::{Invitation, Membership, Team, TeamId, TeamRole};
use crate::domain::user::UserId;
use crate::domain::vault::{Vault, VaultId, WrappedKey};
use crate::domain::DomainError;

/// Consistent, transaction-scoped view of one team aggregate
///
/// All validation functions take this by reference, never a live store, so
/// the checks are trivially testable against a hand-built snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamSnapshot {
    /// Monotonic version the store bumps on every committed write
    pub version: u64,
    pub team: Team,
    pub memberships: Vec<Membership>,
    pub invitations: Vec<Invitation>,
    pub vaults: Vec<Vault>,
}

impl TeamSnapshot {
    /// Role of a user in this team, if they appear in the ledger at all
    pub fn role_of(&self, user_id: &UserId) -> Option<TeamRole> {
        self.memberships
            .iter()
            .find(|m| m.user_id() == user_id)
            .map(|m| m.role())
    }

    /// Whether the user holds admin rights (Owner or Admin)
    pub fn is_admin(&self, user_id: &UserId) -> bool {
        self.role_of(user_id).is_some_and(|r| r.is_admin())
    }

    /// Identifiers of every current Admin/Owner member
    ///
    /// This is the required recipient set for vault creation.
    pub fn admin_ids(&self) -> BTreeSet<UserId> {
        self.memberships
            .iter()
            .filter(|m| m.role().is_admin())
            .map(|m| m.user_id().clone())
            .collect()
    }

    /// Pending invitation for an email, if one exists
    pub fn invitation_for(&self, email: &str) -> Option<&Invitation> {
        self.invitations.iter().find(|i| i.email() == email)
    }

    /// Vaults the user holds a wrapped key for
    pub fn vaults_for(&self, user_id: &UserId) -> Vec<&Vault> {
        self.vaults
            .iter()
            .filter(|v| v.accessible_by(user_id))
            .collect()
    }

    /// Identifiers of the vaults the user holds a wrapped key for
    ///
    /// This is the required coverage set when that user promotes someone.
    pub fn vault_ids_for(&self, user_id: &UserId) -> BTreeSet<VaultId> {
        self.vaults
            .iter()
            .filter(|v| v.accessible_by(user_id))
            .map(|v| v.id().clone())
            .collect()
    }
}

/// One mutation of the team aggregate
///
/// A commit applies a sequence of these atomically; either all take effect or
/// none do.
#[derive(Debug, Clone)]
pub enum TeamWrite {
    /// Insert a new membership record
    AddMember(Membership),
    /// Record a pending invitation
    AddInvitation(Invitation),
    /// Insert a new vault with its full key envelope
    AddVault(Vault),
    /// Add a wrapped key for one recipient to each listed vault
    AddVaultKeys {
        user_id: UserId,
        keys: Vec<(VaultId, WrappedKey)>,
    },
    /// Change an existing member's role
    SetRole { user_id: UserId, role: TeamRole },
}

/// Durable store for teams, memberships, invitations and vaults
///
/// Implementations must make `create_team` and `commit` atomic: a failed call
/// leaves no partial effect. `commit` must reject a stale `expected_version`
/// with `DomainError::Conflict`.
#[async_trait]
pub trait TeamStore: Send + Sync + Debug {
    /// Atomically persist a new team, its owner membership and its initial
    /// default vault.
    async fn create_team(
        &self,
        team: Team,
        owner: Membership,
        default_vault: Vault,
    ) -> Result<(), DomainError>;

    /// Read a consistent snapshot of the whole team aggregate
    async fn snapshot(&self, team_id: &TeamId) -> Result<TeamSnapshot, DomainError>;

    /// Apply a write set atomically, iff the aggregate version still equals
    /// `expected_version`.
    async fn commit(
        &self,
        team_id: &TeamId,
        expected_version: u64,
        writes: Vec<TeamWrite>,
    ) -> Result<(), DomainError>;

    /// Teams in which the user has a membership record of any role
    async fn teams_for_user(&self, user_id: &UserId) -> Result<Vec<Team>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vault::VaultKeyPair;
    use std::collections::BTreeMap;

    fn user(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn vault_for(team_id: &TeamId, name: &str, recipients: &[&str]) -> Vault {
        let keys: BTreeMap<UserId, WrappedKey> = recipients
            .iter()
            .map(|id| (user(id), WrappedKey::new(b"blob".to_vec())))
            .collect();
        Vault::new(
            VaultId::generate(),
            team_id.clone(),
            name,
            VaultKeyPair::new(vec![1u8; 32], keys),
        )
        .unwrap()
    }

    fn snapshot() -> TeamSnapshot {
        let team_id = TeamId::generate();
        let team = Team::new(team_id.clone(), "snapshot team").unwrap();
        let memberships = vec![
            Membership::new(team_id.clone(), user("owner"), TeamRole::Owner),
            Membership::new(team_id.clone(), user("admin"), TeamRole::Admin),
            Membership::new(team_id.clone(), user("member"), TeamRole::Member),
            Membership::new(team_id.clone(), user("pending"), TeamRole::Invited),
        ];
        let invitations = vec![Invitation::new(team_id.clone(), "ghost@example.com")];
        let vaults = vec![
            vault_for(&team_id, "shared", &["owner", "admin"]),
            vault_for(&team_id, "owner-only", &["owner"]),
        ];

        TeamSnapshot {
            version: 1,
            team,
            memberships,
            invitations,
            vaults,
        }
    }

    #[test]
    fn test_role_lookup() {
        let snap = snapshot();
        assert_eq!(snap.role_of(&user("owner")), Some(TeamRole::Owner));
        assert_eq!(snap.role_of(&user("member")), Some(TeamRole::Member));
        assert_eq!(snap.role_of(&user("stranger")), None);
    }

    #[test]
    fn test_admin_checks() {
        let snap = snapshot();
        assert!(snap.is_admin(&user("owner")));
        assert!(snap.is_admin(&user("admin")));
        assert!(!snap.is_admin(&user("member")));
        assert!(!snap.is_admin(&user("pending")));
        assert!(!snap.is_admin(&user("stranger")));
    }

    #[test]
    fn test_admin_ids_excludes_members_and_pending() {
        let snap = snapshot();
        let admins = snap.admin_ids();
        assert_eq!(admins, [user("owner"), user("admin")].into_iter().collect());
    }

    #[test]
    fn test_invitation_lookup() {
        let snap = snapshot();
        assert!(snap.invitation_for("ghost@example.com").is_some());
        assert!(snap.invitation_for("other@example.com").is_none());
    }

    #[test]
    fn test_vaults_for_user_follows_key_coverage() {
        let snap = snapshot();
        assert_eq!(snap.vaults_for(&user("owner")).len(), 2);
        assert_eq!(snap.vaults_for(&user("admin")).len(), 1);
        assert!(snap.vaults_for(&user("member")).is_empty());

        let owner_vaults = snap.vault_ids_for(&user("owner"));
        let admin_vaults = snap.vault_ids_for(&user("admin"));
        assert!(owner_vaults.is_superset(&admin_vaults));
        assert_eq!(owner_vaults.len(), 2);
    }
}
