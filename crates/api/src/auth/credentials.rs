//! Credential store: user records plus secret hashing and verification

use std::sync::Arc;

use time::OffsetDateTime;
use toolgate_shared::{ProfileUpdate, StoreError, User, UserProfile, UserRepository};

use super::password::{hash_password, verify_against_dummy, verify_password, PasswordError};

/// Owns user records. Raw secrets go in, only Argon2 hashes are stored.
#[derive(Clone)]
pub struct CredentialStore {
    repository: Arc<dyn UserRepository>,
}

impl CredentialStore {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Create an account. Fails with `Conflict` if the username is taken.
    pub async fn create(
        &self,
        username: &str,
        raw_secret: &str,
        profile: UserProfile,
    ) -> Result<User, CredentialError> {
        if self.repository.get(username).await?.is_some() {
            return Err(StoreError::Conflict(username.to_string()).into());
        }

        let password_hash = hash_password(raw_secret)?;
        let user = User::new(username, password_hash, profile);
        self.repository.insert(&user).await?;

        tracing::info!(username = %user.username, user_id = %user.id.0, "Account created");
        Ok(user)
    }

    /// Fetch an account by exact username
    pub async fn find(&self, username: &str) -> Result<User, CredentialError> {
        self.repository
            .get(username)
            .await?
            .ok_or_else(|| StoreError::NotFound(username.to_string()).into())
    }

    /// All accounts, oldest first
    pub async fn list(&self) -> Result<Vec<User>, CredentialError> {
        Ok(self.repository.list().await?)
    }

    /// Apply a partial profile change; a new password is re-hashed
    pub async fn update(
        &self,
        username: &str,
        delta: ProfileUpdate,
    ) -> Result<User, CredentialError> {
        let mut user = self.find(username).await?;

        if let Some(email) = delta.email {
            user.profile.email = Some(email);
        }
        if let Some(display_name) = delta.display_name {
            user.profile.display_name = Some(display_name);
        }
        if let Some(password) = delta.password {
            user.password_hash = hash_password(&password)?;
        }
        user.updated_at = OffsetDateTime::now_utc();

        self.repository.update(&user).await?;
        Ok(user)
    }

    /// Hard delete
    pub async fn delete(&self, username: &str) -> Result<(), CredentialError> {
        self.repository.remove(username).await?;
        tracing::info!(username = %username, "Account deleted");
        Ok(())
    }

    /// Check a raw secret against the stored hash.
    ///
    /// Unknown usernames still pay for one Argon2 verification and yield
    /// `false`, so the answer does not reveal whether the account exists.
    pub async fn verify_secret(&self, username: &str, raw_secret: &str) -> Result<bool, CredentialError> {
        match self.repository.get(username).await? {
            Some(user) => Ok(verify_password(raw_secret, &user.password_hash)?),
            None => {
                verify_against_dummy(raw_secret);
                Ok(false)
            }
        }
    }

    /// Backend connectivity check
    pub async fn ping(&self) -> Result<(), CredentialError> {
        Ok(self.repository.ping().await?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}
