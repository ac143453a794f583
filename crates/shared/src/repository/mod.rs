//! User repository backends
//!
//! A repository only persists records whose secret is already hashed. The
//! hashing and credential checks live one layer up, in the API's credential
//! store.

mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::{error::StoreResult, types::User};

pub use memory::MemoryUserRepository;
pub use sqlite::SqliteUserRepository;

/// Storage backend for user records.
///
/// Each call is atomic on its own; callers never hold a lock across calls.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new record. Fails with `Conflict` if the username is taken.
    async fn insert(&self, user: &User) -> StoreResult<()>;

    /// Look up a record by exact (case-sensitive) username.
    async fn get(&self, username: &str) -> StoreResult<Option<User>>;

    /// All records, oldest first.
    async fn list(&self) -> StoreResult<Vec<User>>;

    /// Replace the mutable columns of an existing record. Fails with `NotFound`.
    async fn update(&self, user: &User) -> StoreResult<()>;

    /// Hard delete. Fails with `NotFound`.
    async fn remove(&self, username: &str) -> StoreResult<()>;

    /// Cheap connectivity check for readiness probes.
    async fn ping(&self) -> StoreResult<()>;
}
