//! Toolgate Shared Types and Utilities
//!
//! This crate contains the user model, the storage error taxonomy and the
//! user repository backends shared by the Toolgate API.

pub mod db;
pub mod error;
pub mod repository;
pub mod types;

pub use db::*;
pub use error::*;
pub use repository::{MemoryUserRepository, SqliteUserRepository, UserRepository};
pub use types::*;
