//! Team service - membership, authorization and vault key distribution
//!
//! Every mutating operation is one snapshot-validate-commit transaction: the
//! membership and vault sets a check runs against come from the same
//! versioned snapshot the commit is conditioned on, so a racing mutation
//! surfaces as `Conflict` (or the appropriate "already" error) instead of a
//! partial update against stale state.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::notification::InviteNotifier;
use crate::domain::team::{
    Invitation, Membership, Team, TeamId, TeamRole, TeamSnapshot, TeamStore, TeamWrite,
};
use crate::domain::user::{validate_email, UserId, UserRepository};
use crate::domain::vault::coverage::{check_covers_vaults, check_exact_recipients, CoverageError};
use crate::domain::vault::{PromotionKeySet, Vault, VaultId, VaultKeyPair, WrappedKey};
use crate::domain::DomainError;

/// Name of the vault every team starts with; its key envelope is the `vkp`
/// supplied to `create_team`.
const DEFAULT_VAULT_NAME: &str = "default";

/// Team service: the transaction boundary for all membership and vault
/// mutations of a team.
#[derive(Debug)]
pub struct TeamService<S, U, N>
where
    S: TeamStore,
    U: UserRepository,
    N: InviteNotifier,
{
    store: Arc<S>,
    users: Arc<U>,
    notifier: Arc<N>,
}

impl<S, U, N> TeamService<S, U, N>
where
    S: TeamStore,
    U: UserRepository,
    N: InviteNotifier,
{
    /// Create a new team service
    pub fn new(store: Arc<S>, users: Arc<U>, notifier: Arc<N>) -> Self {
        Self {
            store,
            users,
            notifier,
        }
    }

    /// Create a new team owned by `actor`
    ///
    /// A fresh team ID is generated on every call; names are display-only, so
    /// calling this twice with identical arguments yields two distinct teams.
    /// The supplied key pair seeds the team's default vault, whose only
    /// possible recipient at creation time is the creator.
    pub async fn create_team(
        &self,
        actor: &UserId,
        name: &str,
        vkp: VaultKeyPair,
    ) -> Result<Team, DomainError> {
        info!(actor = %actor, name = %name, "creating team");

        if !self.users.exists(actor).await? {
            return Err(DomainError::not_found(format!("User '{}' not found", actor)));
        }

        if !vkp.is_well_formed() {
            return Err(DomainError::invalid_keys("malformed vault key pair"));
        }
        let creator_only = [actor.clone()].into_iter().collect();
        check_exact_recipients(&vkp.recipients(), &creator_only).map_err(keys_err)?;

        let team =
            Team::new(TeamId::generate(), name).map_err(|e| DomainError::validation(e.to_string()))?;
        let owner = Membership::new(team.id().clone(), actor.clone(), TeamRole::Owner);
        let default_vault = Vault::new(
            VaultId::generate(),
            team.id().clone(),
            DEFAULT_VAULT_NAME,
            vkp,
        )
        .map_err(|e| DomainError::validation(e.to_string()))?;

        self.store
            .create_team(team.clone(), owner, default_vault)
            .await?;

        Ok(team)
    }

    /// Teams in which the user has a membership record
    pub async fn teams_for_user(&self, user_id: &UserId) -> Result<Vec<Team>, DomainError> {
        self.store.teams_for_user(user_id).await
    }

    /// Add an existing account as a full Member, or record a pending
    /// invitation for an unknown email address
    ///
    /// Returns `true` when the email resolved to an account that was added,
    /// `false` when a pending invitation was recorded. Repeating an identical
    /// call never silently succeeds twice: the second call surfaces
    /// `AlreadyInTeam` or `AlreadyInvited`.
    pub async fn add_or_invite_user_by_email(
        &self,
        team_id: &TeamId,
        actor: &UserId,
        email: &str,
    ) -> Result<bool, DomainError> {
        info!(team = %team_id, actor = %actor, "adding or inviting user by email");

        validate_email(email).map_err(|e| DomainError::validation(e.to_string()))?;

        let snap = self.store.snapshot(team_id).await?;
        require_admin(&snap, actor)?;

        match self.users.get_by_email(email).await? {
            Some(user) => {
                if snap.role_of(user.id()).is_some() {
                    return Err(DomainError::already_in_team(format!(
                        "User '{}' is already in team '{}'",
                        user.id(),
                        team_id
                    )));
                }

                let membership =
                    Membership::new(team_id.clone(), user.id().clone(), TeamRole::Member);
                self.store
                    .commit(team_id, snap.version, vec![TeamWrite::AddMember(membership)])
                    .await?;

                info!(team = %team_id, user = %user.id(), "added existing user as member");
                Ok(true)
            }
            None => {
                if snap.invitation_for(email).is_some() {
                    return Err(DomainError::already_invited(format!(
                        "'{}' already has a pending invitation to team '{}'",
                        email, team_id
                    )));
                }

                let invitation = Invitation::new(team_id.clone(), email);
                self.store
                    .commit(
                        team_id,
                        snap.version,
                        vec![TeamWrite::AddInvitation(invitation)],
                    )
                    .await?;

                // Fire and forget: a failed notice never rolls back the invitation
                if let Err(e) = self.notifier.notify_invited(email, &snap.team).await {
                    warn!(team = %team_id, email = %email, error = %e, "invitation notice failed");
                }

                info!(team = %team_id, email = %email, "recorded pending invitation");
                Ok(false)
            }
        }
    }

    /// Create a new vault for the team
    ///
    /// The supplied key pair must carry a wrapped key for EXACTLY the current
    /// Admin/Owner set, read in the same transaction as the write. A missing
    /// admin would be locked out of the vault; an extra recipient means the
    /// client worked from stale membership data. Both directions fail with
    /// `InvalidKeys` so the client recomputes and retries.
    pub async fn create_vault(
        &self,
        team_id: &TeamId,
        actor: &UserId,
        name: &str,
        vkp: VaultKeyPair,
    ) -> Result<Vault, DomainError> {
        info!(team = %team_id, actor = %actor, name = %name, "creating vault");

        let snap = self.store.snapshot(team_id).await?;
        require_admin(&snap, actor)?;

        if !vkp.is_well_formed() {
            return Err(DomainError::invalid_keys("malformed vault key pair"));
        }
        check_exact_recipients(&vkp.recipients(), &snap.admin_ids()).map_err(keys_err)?;

        let vault = Vault::new(VaultId::generate(), team_id.clone(), name, vkp)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        self.store
            .commit(team_id, snap.version, vec![TeamWrite::AddVault(vault.clone())])
            .await?;

        Ok(vault)
    }

    /// Vaults of the team the user holds a wrapped key for
    ///
    /// Vault membership is derived purely from key coverage; there is no
    /// separate grant table. Pure snapshot read, safe against concurrent
    /// mutations. The result is deterministically ordered by name, then id.
    pub async fn get_vaults_for_user(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
    ) -> Result<Vec<Vault>, DomainError> {
        debug!(team = %team_id, user = %user_id, "listing vaults for user");

        let snap = self.store.snapshot(team_id).await?;
        let mut vaults: Vec<Vault> = snap.vaults_for(user_id).into_iter().cloned().collect();
        vaults.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));

        Ok(vaults)
    }

    /// Elevate an existing member to Admin
    ///
    /// `keys` must supply a wrapped key for `target` for every vault the
    /// promoting admin currently has access to; promotion is additive and
    /// scoped to the one new recipient, so only coverage (not exact match) is
    /// required. The key grants and the role change commit atomically.
    pub async fn promote_user(
        &self,
        team_id: &TeamId,
        actor: &UserId,
        target: &UserId,
        keys: PromotionKeySet,
    ) -> Result<(), DomainError> {
        info!(team = %team_id, actor = %actor, target = %target, "promoting user");

        let snap = self.store.snapshot(team_id).await?;
        require_admin(&snap, actor)?;

        let target_role = snap.role_of(target).ok_or_else(|| {
            DomainError::not_found(format!(
                "User '{}' is not a member of team '{}'",
                target, team_id
            ))
        })?;
        if target_role.is_pending() {
            return Err(DomainError::unauthorized(format!(
                "User '{}' has not accepted their membership yet",
                target
            )));
        }
        if target_role.is_admin() {
            return Err(DomainError::unauthorized(format!(
                "User '{}' already holds admin rights",
                target
            )));
        }

        let required = snap.vault_ids_for(actor);
        check_covers_vaults(&keys, &required).map_err(keys_err)?;

        let grants: Vec<(VaultId, WrappedKey)> = required
            .iter()
            .filter_map(|vid| keys.get(vid).map(|k| (vid.clone(), k.clone())))
            .collect();
        if grants.iter().any(|(_, k)| k.is_empty()) {
            return Err(DomainError::invalid_keys("empty wrapped key blob"));
        }

        self.store
            .commit(
                team_id,
                snap.version,
                vec![
                    TeamWrite::AddVaultKeys {
                        user_id: target.clone(),
                        keys: grants,
                    },
                    TeamWrite::SetRole {
                        user_id: target.clone(),
                        role: TeamRole::Admin,
                    },
                ],
            )
            .await
    }

    /// Set an Admin back to plain Member
    ///
    /// Only admins may demote, and the Owner can never be demoted; a member
    /// being demoted cannot turn around and demote the admin demoting them.
    /// Already-issued wrapped vault keys are left in place; revoking them
    /// requires key rotation, which is a separate concern.
    pub async fn demote_user(
        &self,
        team_id: &TeamId,
        actor: &UserId,
        target: &UserId,
    ) -> Result<(), DomainError> {
        info!(team = %team_id, actor = %actor, target = %target, "demoting user");

        let snap = self.store.snapshot(team_id).await?;
        require_admin(&snap, actor)?;

        let target_role = snap.role_of(target).ok_or_else(|| {
            DomainError::not_found(format!(
                "User '{}' is not a member of team '{}'",
                target, team_id
            ))
        })?;
        if target_role == TeamRole::Owner {
            return Err(DomainError::unauthorized("the team owner cannot be demoted"));
        }
        if target_role.is_pending() {
            return Err(DomainError::unauthorized(format!(
                "User '{}' has not accepted their membership yet",
                target
            )));
        }

        self.store
            .commit(
                team_id,
                snap.version,
                vec![TeamWrite::SetRole {
                    user_id: target.clone(),
                    role: TeamRole::Member,
                }],
            )
            .await
    }

    /// Whether the user holds admin rights (Owner or Admin) in the team
    pub async fn check_admin(
        &self,
        team_id: &TeamId,
        user_id: &UserId,
    ) -> Result<bool, DomainError> {
        let snap = self.store.snapshot(team_id).await?;
        Ok(snap.is_admin(user_id))
    }
}

fn require_admin(snap: &TeamSnapshot, actor: &UserId) -> Result<(), DomainError> {
    let allowed = snap
        .role_of(actor)
        .is_some_and(|role| role.can_manage_members());

    if allowed {
        Ok(())
    } else {
        Err(DomainError::unauthorized(format!(
            "User '{}' is not an admin of team '{}'",
            actor,
            snap.team.id()
        )))
    }
}

fn keys_err(e: CoverageError) -> DomainError {
    DomainError::invalid_keys(e.to_string())
}
