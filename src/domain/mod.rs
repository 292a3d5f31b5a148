//! Domain layer - Core business logic and entities

pub mod error;
pub mod notification;
pub mod team;
pub mod user;
pub mod vault;

pub use error::DomainError;
pub use notification::InviteNotifier;
pub use team::{
    Invitation, Membership, Team, TeamId, TeamRole, TeamSnapshot, TeamStore, TeamWrite,
};
pub use user::{User, UserId, UserRepository};
pub use vault::{PromotionKeySet, Vault, VaultId, VaultKeyPair, WrappedKey};
