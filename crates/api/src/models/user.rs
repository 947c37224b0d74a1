//! User domain types.

use chrono::{DateTime, Utc};

use ladle_core::{Email, UserId};

/// An account (domain type).
///
/// The credential hash never leaves the database layer; handlers only see
/// this type.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address, normalized on creation.
    pub email: Email,
    /// Whether the user may access staff tooling.
    pub is_staff: bool,
    /// Whether the user bypasses permission checks.
    pub is_superuser: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
