//! User repository for database operations.
//!
//! Accounts and their API tokens. Password hashing and token issuance
//! endpoints are not part of this service; the repository stores whatever
//! opaque credential hash the caller provides and can mint bearer keys for
//! provisioning and tests.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use ladle_core::{Email, UserId};

use super::RepositoryError;
use crate::models::user::User;

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// The email is already normalized by [`Email::parse`] (domain
    /// lower-cased, local part preserved) and cannot be empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, email: &Email, password_hash: &str) -> Result<User, RepositoryError> {
        self.insert(email, password_hash, false, false).await
    }

    /// Create a new superuser (staff + superuser flags set).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_superuser(
        &self,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        self.insert(email, password_hash, true, true).await
    }

    async fn insert(
        &self,
        email: &Email,
        password_hash: &str,
        is_staff: bool,
        is_superuser: bool,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO app_user (email, password_hash, is_staff, is_superuser)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, is_staff, is_superuser, created_at
            ",
        )
        .bind(email.as_str())
        .bind(password_hash)
        .bind(is_staff)
        .bind(is_superuser)
        .fetch_one(self.pool)
        .await
        .map_err(|e| super::conflict_on_unique(e, "email already exists"))?;

        row.try_into()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, email, is_staff, is_superuser, created_at
            FROM app_user
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::try_into).transpose()
    }

    /// Issue a new API token for a user and return its key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn issue_token(&self, user_id: UserId) -> Result<String, RepositoryError> {
        let key = Uuid::new_v4().simple().to_string();

        sqlx::query(
            r"
            INSERT INTO api_token (user_id, key)
            VALUES ($1, $2)
            ",
        )
        .bind(user_id)
        .bind(&key)
        .execute(self.pool)
        .await?;

        Ok(key)
    }

    /// Resolve a bearer key to its user.
    ///
    /// Returns `None` for unknown keys; the caller maps that to 401.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_token(&self, key: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT u.id, u.email, u.is_staff, u.is_superuser, u.created_at
            FROM app_user u
            JOIN api_token t ON t.user_id = u.id
            WHERE t.key = $1
            ",
        )
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::try_into).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    is_staff: bool,
    is_superuser: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            email,
            is_staff: row.is_staff,
            is_superuser: row.is_superuser,
            created_at: row.created_at,
        })
    }
}
