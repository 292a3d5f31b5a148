//! Teamvault core
//!
//! Access-control and key-distribution engine for a multi-tenant,
//! end-to-end-encrypted team secret vault. Teams own vaults; each vault's
//! content key exists server-side only as per-recipient wrapped blobs, and
//! this crate enforces the coverage invariant: every team admin holds a
//! wrapped copy of every vault key, and membership-changing operations update
//! that coverage atomically or fail outright.
//!
//! The crate never encrypts or decrypts anything. Wrapped keys are opaque
//! client-produced bytes; all validation is set arithmetic over recipient
//! identifiers. Transport, mail delivery, sessions and the relational storage
//! drivers live in the surrounding service and plug in through the traits in
//! [`domain`].

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::{
    DomainError, Invitation, InviteNotifier, Membership, PromotionKeySet, Team, TeamId, TeamRole,
    TeamSnapshot, TeamStore, TeamWrite, User, UserId, UserRepository, Vault, VaultId, VaultKeyPair,
    WrappedKey,
};
pub use infrastructure::services::TeamService;
pub use infrastructure::storage::{InMemoryTeamStore, InMemoryUserRepository};
