//! Database access for the Ladle API.
//!
//! Repositories issue explicit queries; there is no implicit lazy loading.
//! Every query that touches a user-owned row filters by `user_id` first, so
//! an id belonging to another user is indistinguishable from a missing one.
//!
//! ## Tables
//!
//! - `app_user` - accounts (email unique, normalized on creation)
//! - `api_token` - opaque bearer keys for request authentication
//! - `recipe` - recipe scalars plus the stored image path
//! - `tag` / `ingredient` - user-scoped labels, unique per `(user_id, name)`
//! - `recipe_tag` / `recipe_ingredient` - many-to-many join tables
//!
//! Migrations live in `crates/api/migrations/` and are embedded via
//! [`MIGRATOR`]; the binary runs them on startup.

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub mod labels;
pub mod recipes;
pub mod users;

pub use labels::{Ingredients, LabelKind, LabelRepository, LabelRow, Tags};
pub use recipes::RecipeRepository;
pub use users::UserRepository;

/// Embedded migrations from `crates/api/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Underlying database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// No row matched an owner-scoped lookup. Deliberately does not say
    /// whether the row exists under another owner.
    #[error("not found")]
    NotFound,

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored value failed to parse back into its domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a sqlx error to [`RepositoryError::Conflict`] when it is a unique
/// violation, passing everything else through as a database error.
fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}
