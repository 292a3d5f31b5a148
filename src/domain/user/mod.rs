//! User domain module
//!
//! Users are created by account registration outside this core; here they are
//! only resolved (by id or email) and referenced from memberships and key
//! mappings.

mod entity;
mod repository;
mod validation;

pub use entity::{User, UserId};
pub use repository::UserRepository;
pub use validation::{validate_email, validate_user_id, UserValidationError};
