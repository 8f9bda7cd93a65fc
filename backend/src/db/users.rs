//! Users repository for accounts and privileges

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use super::sqlite_helpers::{new_id, now_iso8601, placeholders};
use super::unique_violation_column;
use crate::error::{LibraryError, Result};

const USER_COLUMNS: &str = "id, email, username, first_name, last_name, password_hash, \
     is_admin, is_staff, is_active, last_login_at, created_at, updated_at";

// ============================================================================
// User Records
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub is_staff: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Allowed to manage the catalog and read reports
    pub fn is_staff_or_admin(&self) -> bool {
        self.is_staff || self.is_admin
    }
}

#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_staff: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserFlags {
    pub is_admin: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_active: Option<bool>,
}

// ============================================================================
// Repository
// ============================================================================

pub struct UsersRepository {
    pool: SqlitePool,
}

impl UsersRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// A concurrent insert of the same email or username loses on the
    /// UNIQUE constraint and is reported as a conflict on that field.
    pub async fn create(&self, user: CreateUser) -> Result<UserRecord> {
        let id = new_id();
        let now = now_iso8601();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, username, first_name, last_name, password_hash,
                               is_admin, is_staff, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.username)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.is_admin)
        .bind(user.is_staff)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match unique_violation_column(&e).as_deref() {
            Some("users.email") => {
                LibraryError::conflict("email", format!("{} email exists", user.email))
            }
            Some("users.username") => {
                LibraryError::conflict("username", format!("{} username exists", user.username))
            }
            _ => e.into(),
        })?;

        self.get_by_id(&id)
            .await?
            .ok_or_else(|| LibraryError::Internal("Failed to create user".to_string()))
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Get user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE email = ? COLLATE NOCASE",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Fetch every user whose id is in `ids` (unknown ids are skipped)
    pub async fn get_many(&self, ids: &[String]) -> Result<Vec<UserRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM users WHERE id IN ({})",
            USER_COLUMNS,
            placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, UserRecord>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    /// Update user's last login timestamp
    pub async fn update_last_login(&self, id: &str) -> Result<u64> {
        let now = now_iso8601();
        let result = sqlx::query("UPDATE users SET last_login_at = ?, updated_at = ? WHERE id = ?")
            .bind(&now)
            .bind(&now)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Update privilege/activation flags; `None` leaves a flag unchanged
    pub async fn update_flags(&self, id: &str, flags: UpdateUserFlags) -> Result<Option<UserRecord>> {
        let now = now_iso8601();
        let result = sqlx::query(
            r#"
            UPDATE users SET
                is_admin = COALESCE(?, is_admin),
                is_staff = COALESCE(?, is_staff),
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(flags.is_admin)
        .bind(flags.is_staff)
        .bind(flags.is_active)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }
}
