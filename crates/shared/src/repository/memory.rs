//! In-process repository backed by a `HashMap`

use std::collections::{hash_map::Entry, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::UserRepository;
use crate::{
    error::{StoreError, StoreResult},
    types::User,
};

/// Keeps every record in memory; contents vanish with the process.
#[derive(Clone, Default)]
pub struct MemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        match users.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(user.username.clone())),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }

    async fn get(&self, username: &str) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let mut all: Vec<User> = self.users.read().await.values().cloned().collect();
        all.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.username.cmp(&b.username))
        });
        Ok(all)
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.username) {
            Some(existing) => {
                *existing = user.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(user.username.clone())),
        }
    }

    async fn remove(&self, username: &str) -> StoreResult<()> {
        self.users
            .write()
            .await
            .remove(username)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(username.to_string()))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
