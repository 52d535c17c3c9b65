//! # User Repository
//!
//! Profile records: who a uid is and whether they are an admin.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use rentshelf_core::ports::ProfileStore;
use rentshelf_core::{CoreResult, Role, UserProfile};

use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    uid: String,
    email: String,
    full_name: Option<String>,
    role: Role,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for UserProfile {
    fn from(row: UserRow) -> Self {
        UserProfile {
            uid: row.uid,
            email: row.email,
            full_name: row.full_name,
            role: row.role,
            created_at: row.created_at,
        }
    }
}

/// Repository for user profiles.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a profile by uid.
    pub async fn get_by_uid(&self, uid: &str) -> DbResult<Option<UserProfile>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT uid, email, full_name, role, created_at FROM users WHERE uid = ?1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserProfile::from))
    }

    /// Gets a profile by email.
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<UserProfile>> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT uid, email, full_name, role, created_at FROM users WHERE email = ?1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserProfile::from))
    }

    /// Stores a new profile.
    pub async fn insert(&self, profile: &UserProfile) -> DbResult<()> {
        debug!(uid = %profile.uid, role = ?profile.role, "Inserting user profile");

        sqlx::query(
            r#"
            INSERT INTO users (uid, email, full_name, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&profile.uid)
        .bind(&profile.email)
        .bind(&profile.full_name)
        .bind(profile.role)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ProfileStore for UserRepository {
    async fn get_profile(&self, uid: &str) -> CoreResult<Option<UserProfile>> {
        Ok(self.get_by_uid(uid).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};

    fn profile(uid: &str, role: Role) -> UserProfile {
        UserProfile {
            uid: uid.to_string(),
            email: format!("{uid}@example.com"),
            full_name: Some("Asha Rao".to_string()),
            role,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let users = Database::new(DbConfig::in_memory()).await.unwrap().users();
        let admin = profile(&uuid::Uuid::new_v4().to_string(), Role::Admin);
        users.insert(&admin).await.unwrap();

        let stored = users.get_by_uid(&admin.uid).await.unwrap().unwrap();
        assert_eq!(stored, admin);
        assert!(stored.identity().is_admin());

        let by_email = users.get_by_email(&admin.email).await.unwrap().unwrap();
        assert_eq!(by_email.uid, admin.uid);
        assert!(users.get_profile("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let users = Database::new(DbConfig::in_memory()).await.unwrap().users();
        users.insert(&profile("u1", Role::Shopper)).await.unwrap();

        let mut twin = profile("u2", Role::Shopper);
        twin.email = "u1@example.com".to_string();
        assert!(matches!(
            users.insert(&twin).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }
}
