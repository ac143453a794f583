//! Authentication module for Toolgate

pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use credentials::{CredentialError, CredentialStore};
pub use jwt::{Claims, IssuedToken, JwtManager, TokenError};
pub use middleware::{require_auth, AuthState, AuthUser};
pub use password::{hash_password, validate_password, verify_password};
