//! Team domain module
//!
//! Teams own their membership ledger and their vaults; the team aggregate is
//! the transaction boundary for every invariant this core enforces, most
//! importantly key coverage: each Admin/Owner must hold a wrapped copy of
//! every vault key of the team.

mod entity;
mod repository;
mod validation;

pub use entity::{Invitation, Membership, Team, TeamId, TeamRole};
pub use repository::{TeamSnapshot, TeamStore, TeamWrite};
pub use validation::{validate_team_id, validate_team_name, TeamValidationError};
