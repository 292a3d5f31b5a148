//! Storage implementations
//!
//! The relational drivers (PostgreSQL/CockroachDB) live in the surrounding
//! service; this crate ships the in-memory implementation used by tests and
//! development setups.

mod in_memory;

pub use in_memory::{InMemoryTeamStore, InMemoryUserRepository};
