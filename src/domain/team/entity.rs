//! Team entity, membership ledger and invitations

use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{validate_team_id, validate_team_name, TeamValidationError};
use crate::domain::user::UserId;

/// Length of the random token attached to a pending invitation
const INVITE_TOKEN_LENGTH: usize = 32;

/// Team identifier - alphanumeric + hyphens, max 50 characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TeamId(String);

impl TeamId {
    /// Create a new TeamId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, TeamValidationError> {
        let id = id.into();
        validate_team_id(&id)?;
        Ok(Self(id))
    }

    /// Generate a fresh random team ID
    ///
    /// Every `CreateTeam` call gets a new one, even when the display name
    /// collides with an existing team.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TeamId {
    type Error = TeamValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TeamId> for String {
    fn from(id: TeamId) -> Self {
        id.0
    }
}

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a user within a team
///
/// A closed variant rather than booleans so the single-Owner invariant and
/// the pending state stay explicit. `Invited` covers both an email with no
/// resolvable account yet and a resolved account awaiting acceptance; the two
/// pending shapes behave identically here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TeamRole {
    /// Team creator - exactly one per team, fixed at creation
    Owner,
    /// Holds a wrapped copy of every vault key of the team
    Admin,
    /// Regular team member
    #[default]
    Member,
    /// Pending membership awaiting acceptance
    Invited,
}

impl TeamRole {
    /// Owner and Admin carry admin rights
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }

    /// Check if this role can manage team members and vaults
    pub fn can_manage_members(&self) -> bool {
        self.is_admin()
    }

    /// Pending memberships have no rights until accepted
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Invited)
    }
}

impl std::fmt::Display for TeamRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Admin => write!(f, "admin"),
            Self::Member => write!(f, "member"),
            Self::Invited => write!(f, "invited"),
        }
    }
}

/// Team entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier
    id: TeamId,
    /// Display name, not a uniqueness key
    name: String,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Team {
    /// Create a new team
    pub fn new(id: TeamId, name: impl Into<String>) -> Result<Self, TeamValidationError> {
        let name = name.into();
        validate_team_name(&name)?;
        let now = Utc::now();

        Ok(Self {
            id,
            name,
            created_at: now,
            updated_at: now,
        })
    }

    // Getters

    pub fn id(&self) -> &TeamId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Membership ledger entry: one (team, user) pair and its role
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    team_id: TeamId,
    user_id: UserId,
    role: TeamRole,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last role change
    updated_at: DateTime<Utc>,
}

impl Membership {
    /// Create a new membership record
    pub fn new(team_id: TeamId, user_id: UserId, role: TeamRole) -> Self {
        let now = Utc::now();
        Self {
            team_id,
            user_id,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    // Getters

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> TeamRole {
        self.role
    }

    /// Change the role. The Owner role is assigned only at team creation and
    /// never through this mutator; callers enforce that.
    pub fn set_role(&mut self, role: TeamRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }
}

/// Pending invitation for an email address with no resolvable account
///
/// Keyed by the raw email string within its team. Carries the random token
/// the invite mail embeds so that later registration can claim it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
    team_id: TeamId,
    email: String,
    token: String,
    created_at: DateTime<Utc>,
}

impl Invitation {
    /// Create a new invitation with a fresh random token
    pub fn new(team_id: TeamId, email: impl Into<String>) -> Self {
        Self {
            team_id,
            email: email.into(),
            token: generate_invite_token(),
            created_at: Utc::now(),
        }
    }

    // Getters

    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

fn generate_invite_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}
