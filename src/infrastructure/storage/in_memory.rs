//! In-memory storage implementations
//!
//! Useful for testing and development. Data is lost when the process
//! terminates. Atomicity is provided by taking one write lock across a whole
//! commit: either every write in the set is applied and the aggregate version
//! is bumped, or the record is left untouched.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::team::{Invitation, Membership, Team, TeamId, TeamSnapshot, TeamStore, TeamWrite};
use crate::domain::user::{User, UserId, UserRepository};
use crate::domain::vault::Vault;
use crate::domain::DomainError;

/// One team aggregate plus its optimistic-concurrency version
#[derive(Debug, Clone)]
struct TeamRecord {
    version: u64,
    team: Team,
    memberships: Vec<Membership>,
    invitations: Vec<Invitation>,
    vaults: Vec<Vault>,
}

/// Thread-safe in-memory team store
#[derive(Debug, Default)]
pub struct InMemoryTeamStore {
    records: RwLock<HashMap<String, TeamRecord>>,
}

impl InMemoryTeamStore {
    /// Creates a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(record: &mut TeamRecord, write: TeamWrite) -> Result<(), DomainError> {
        match write {
            TeamWrite::AddMember(membership) => {
                if record
                    .memberships
                    .iter()
                    .any(|m| m.user_id() == membership.user_id())
                {
                    return Err(DomainError::conflict(format!(
                        "Membership for '{}' already exists",
                        membership.user_id()
                    )));
                }
                record.memberships.push(membership);
            }
            TeamWrite::AddInvitation(invitation) => {
                if record
                    .invitations
                    .iter()
                    .any(|i| i.email() == invitation.email())
                {
                    return Err(DomainError::conflict(format!(
                        "Invitation for '{}' already exists",
                        invitation.email()
                    )));
                }
                record.invitations.push(invitation);
            }
            TeamWrite::AddVault(vault) => {
                if record.vaults.iter().any(|v| v.id() == vault.id()) {
                    return Err(DomainError::conflict(format!(
                        "Vault '{}' already exists",
                        vault.id()
                    )));
                }
                record.vaults.push(vault);
            }
            TeamWrite::AddVaultKeys { user_id, keys } => {
                for (vault_id, key) in keys {
                    let vault = record
                        .vaults
                        .iter_mut()
                        .find(|v| *v.id() == vault_id)
                        .ok_or_else(|| {
                            DomainError::not_found(format!("Vault '{}' not found", vault_id))
                        })?;
                    vault.add_wrapped_key(user_id.clone(), key);
                }
            }
            TeamWrite::SetRole { user_id, role } => {
                let membership = record
                    .memberships
                    .iter_mut()
                    .find(|m| *m.user_id() == user_id)
                    .ok_or_else(|| {
                        DomainError::not_found(format!(
                            "Membership for '{}' not found",
                            user_id
                        ))
                    })?;
                membership.set_role(role);
            }
        }

        Ok(())
    }
}

#[async_trait]
impl TeamStore for InMemoryTeamStore {
    async fn create_team(
        &self,
        team: Team,
        owner: Membership,
        default_vault: Vault,
    ) -> Result<(), DomainError> {
        let key = team.id().as_str().to_string();
        let mut records = self
            .records
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        if records.contains_key(&key) {
            return Err(DomainError::conflict(format!(
                "Team '{}' already exists",
                team.id()
            )));
        }

        records.insert(
            key,
            TeamRecord {
                version: 1,
                team,
                memberships: vec![owner],
                invitations: Vec::new(),
                vaults: vec![default_vault],
            },
        );

        Ok(())
    }

    async fn snapshot(&self, team_id: &TeamId) -> Result<TeamSnapshot, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        let record = records
            .get(team_id.as_str())
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", team_id)))?;

        Ok(TeamSnapshot {
            version: record.version,
            team: record.team.clone(),
            memberships: record.memberships.clone(),
            invitations: record.invitations.clone(),
            vaults: record.vaults.clone(),
        })
    }

    async fn commit(
        &self,
        team_id: &TeamId,
        expected_version: u64,
        writes: Vec<TeamWrite>,
    ) -> Result<(), DomainError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        let record = records
            .get_mut(team_id.as_str())
            .ok_or_else(|| DomainError::not_found(format!("Team '{}' not found", team_id)))?;

        if record.version != expected_version {
            return Err(DomainError::conflict(format!(
                "Team '{}' was modified concurrently (version {} != {})",
                team_id, record.version, expected_version
            )));
        }

        // Stage on a copy so a failing write leaves the record untouched
        let mut staged = record.clone();
        for write in writes {
            Self::apply(&mut staged, write)?;
        }
        staged.version += 1;
        *record = staged;

        Ok(())
    }

    async fn teams_for_user(&self, user_id: &UserId) -> Result<Vec<Team>, DomainError> {
        let records = self
            .records
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        let mut teams: Vec<Team> = records
            .values()
            .filter(|r| r.memberships.iter().any(|m| m.user_id() == user_id))
            .map(|r| r.team.clone())
            .collect();
        teams.sort_by(|a, b| a.id().cmp(b.id()));

        Ok(teams)
    }
}

/// Thread-safe in-memory identity store
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    /// Creates a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let users = self
            .users
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(users.get(id.as_str()).cloned())
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self
            .users
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire read lock: {}", e)))?;

        Ok(users.values().find(|u| u.email() == email).cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self
            .users
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire write lock: {}", e)))?;

        if users.contains_key(user.id().as_str()) {
            return Err(DomainError::conflict(format!(
                "User '{}' already exists",
                user.id()
            )));
        }

        if users.values().any(|u| u.email() == user.email()) {
            return Err(DomainError::conflict(format!(
                "Email '{}' is already registered",
                user.email()
            )));
        }

        users.insert(user.id().as_str().to_string(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::team::TeamRole;
    use crate::domain::vault::{VaultId, VaultKeyPair, WrappedKey};
    use std::collections::BTreeMap;

    fn user_id(id: &str) -> UserId {
        UserId::new(id).unwrap()
    }

    fn vkp_for(ids: &[&str]) -> VaultKeyPair {
        let keys: BTreeMap<UserId, WrappedKey> = ids
            .iter()
            .map(|id| (user_id(id), WrappedKey::new(b"blob".to_vec())))
            .collect();
        VaultKeyPair::new(vec![3u8; 32], keys)
    }

    async fn seeded_store() -> (InMemoryTeamStore, TeamId) {
        let store = InMemoryTeamStore::new();
        let team = Team::new(TeamId::generate(), "storage team").unwrap();
        let team_id = team.id().clone();
        let owner = Membership::new(team_id.clone(), user_id("owner"), TeamRole::Owner);
        let vault = Vault::new(
            VaultId::generate(),
            team_id.clone(),
            "default",
            vkp_for(&["owner"]),
        )
        .unwrap();

        store.create_team(team, owner, vault).await.unwrap();
        (store, team_id)
    }

    #[tokio::test]
    async fn test_create_team_and_snapshot() {
        let (store, team_id) = seeded_store().await;

        let snap = store.snapshot(&team_id).await.unwrap();
        assert_eq!(snap.version, 1);
        assert_eq!(snap.memberships.len(), 1);
        assert_eq!(snap.vaults.len(), 1);
        assert!(snap.is_admin(&user_id("owner")));
    }

    #[tokio::test]
    async fn test_create_team_duplicate_id() {
        let store = InMemoryTeamStore::new();
        let team = Team::new(TeamId::new("fixed-id").unwrap(), "one").unwrap();
        let owner = Membership::new(team.id().clone(), user_id("owner"), TeamRole::Owner);
        let vault = Vault::new(
            VaultId::generate(),
            team.id().clone(),
            "default",
            vkp_for(&["owner"]),
        )
        .unwrap();

        store
            .create_team(team.clone(), owner.clone(), vault.clone())
            .await
            .unwrap();
        let err = store.create_team(team, owner, vault).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_snapshot_unknown_team() {
        let store = InMemoryTeamStore::new();
        let err = store.snapshot(&TeamId::generate()).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_commit_bumps_version() {
        let (store, team_id) = seeded_store().await;

        let membership = Membership::new(team_id.clone(), user_id("bob"), TeamRole::Member);
        store
            .commit(&team_id, 1, vec![TeamWrite::AddMember(membership)])
            .await
            .unwrap();

        let snap = store.snapshot(&team_id).await.unwrap();
        assert_eq!(snap.version, 2);
        assert_eq!(snap.role_of(&user_id("bob")), Some(TeamRole::Member));
    }

    #[tokio::test]
    async fn test_commit_stale_version_conflicts() {
        let (store, team_id) = seeded_store().await;

        let first = Membership::new(team_id.clone(), user_id("bob"), TeamRole::Member);
        store
            .commit(&team_id, 1, vec![TeamWrite::AddMember(first)])
            .await
            .unwrap();

        // Second writer still holds the version-1 snapshot
        let second = Membership::new(team_id.clone(), user_id("carol"), TeamRole::Member);
        let err = store
            .commit(&team_id, 1, vec![TeamWrite::AddMember(second)])
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));

        let snap = store.snapshot(&team_id).await.unwrap();
        assert!(snap.role_of(&user_id("carol")).is_none());
    }

    #[tokio::test]
    async fn test_failed_write_set_applies_nothing() {
        let (store, team_id) = seeded_store().await;

        // AddMember is fine, SetRole targets a missing membership
        let writes = vec![
            TeamWrite::AddMember(Membership::new(
                team_id.clone(),
                user_id("bob"),
                TeamRole::Member,
            )),
            TeamWrite::SetRole {
                user_id: user_id("ghost"),
                role: TeamRole::Admin,
            },
        ];
        let err = store.commit(&team_id, 1, writes).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));

        let snap = store.snapshot(&team_id).await.unwrap();
        assert_eq!(snap.version, 1);
        assert!(snap.role_of(&user_id("bob")).is_none());
    }

    #[tokio::test]
    async fn test_add_vault_keys() {
        let (store, team_id) = seeded_store().await;
        let snap = store.snapshot(&team_id).await.unwrap();
        let vault_id = snap.vaults[0].id().clone();

        store
            .commit(
                &team_id,
                1,
                vec![TeamWrite::AddVaultKeys {
                    user_id: user_id("bob"),
                    keys: vec![(vault_id, WrappedKey::new(b"bob-blob".to_vec()))],
                }],
            )
            .await
            .unwrap();

        let snap = store.snapshot(&team_id).await.unwrap();
        assert!(snap.vaults[0].accessible_by(&user_id("bob")));
        assert!(snap.vaults[0].accessible_by(&user_id("owner")));
    }

    #[tokio::test]
    async fn test_teams_for_user() {
        let (store, team_id) = seeded_store().await;

        let teams = store.teams_for_user(&user_id("owner")).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].id(), &team_id);

        assert!(store
            .teams_for_user(&user_id("stranger"))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_user_repository_email_uniqueness() {
        let repo = InMemoryUserRepository::new();
        let alice = User::new(user_id("alice"), "alice@example.com").unwrap();
        repo.create(alice).await.unwrap();

        let dup = User::new(user_id("alice2"), "alice@example.com").unwrap();
        let err = repo.create(dup).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));

        let found = repo.get_by_email("alice@example.com").await.unwrap();
        assert_eq!(found.unwrap().id().as_str(), "alice");
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }
}
