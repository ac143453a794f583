//! SQLite repository built on sqlx

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::UserRepository;
use crate::{
    error::{StoreError, StoreResult},
    types::{User, UserId, UserProfile},
};

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    password_hash: String,
    email: Option<String>,
    display_name: Option<String>,
    is_active: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId(row.id),
            username: row.username,
            password_hash: row.password_hash,
            profile: UserProfile {
                email: row.email,
                display_name: row.display_name,
            },
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const SELECT_USER: &str = r#"
    SELECT id, username, password_hash, email, display_name, is_active, created_at, updated_at
    FROM users
"#;

/// Persists users in the `users` table
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn insert(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, email, display_name, is_active, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id.0)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.profile.email)
        .bind(&user.profile.display_name)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Conflict(user.username.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, username: &str) -> StoreResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(&format!("{SELECT_USER} WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(User::from))
    }

    async fn list(&self) -> StoreResult<Vec<User>> {
        let rows: Vec<UserRow> =
            sqlx::query_as(&format!("{SELECT_USER} ORDER BY created_at, username"))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update(&self, user: &User) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $1, email = $2, display_name = $3, is_active = $4, updated_at = $5
            WHERE username = $6
            "#,
        )
        .bind(&user.password_hash)
        .bind(&user.profile.email)
        .bind(&user.profile.display_name)
        .bind(user.is_active)
        .bind(user.updated_at)
        .bind(&user.username)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(user.username.clone()));
        }
        Ok(())
    }

    async fn remove(&self, username: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(username.to_string()));
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
