//! Labeled-entity repository shared by tags and ingredients.
//!
//! Tags and ingredients have identical shape and invariants: a name, an
//! owner, and a `(user_id, name)` uniqueness constraint. The repository is
//! generic over a [`LabelKind`] marker carrying the table names, so the
//! get-or-create and listing logic exists once.

use std::marker::PhantomData;

use sqlx::{PgConnection, PgPool};

use ladle_core::{Label, UserId};

use super::RepositoryError;

/// Marker trait naming the tables behind a label kind.
pub trait LabelKind: Send + Sync + 'static {
    /// Table holding the labels themselves.
    const TABLE: &'static str;
    /// Join table linking labels to recipes.
    const JOIN_TABLE: &'static str;
    /// Column of [`Self::JOIN_TABLE`] referencing the label.
    const JOIN_COLUMN: &'static str;
    /// Lowercase noun for messages ("tag", "ingredient").
    const NOUN: &'static str;
}

/// Marker for the `tag` table.
pub struct Tags;

impl LabelKind for Tags {
    const TABLE: &'static str = "tag";
    const JOIN_TABLE: &'static str = "recipe_tag";
    const JOIN_COLUMN: &'static str = "tag_id";
    const NOUN: &'static str = "tag";
}

/// Marker for the `ingredient` table.
pub struct Ingredients;

impl LabelKind for Ingredients {
    const TABLE: &'static str = "ingredient";
    const JOIN_TABLE: &'static str = "recipe_ingredient";
    const JOIN_COLUMN: &'static str = "ingredient_id";
    const NOUN: &'static str = "ingredient";
}

/// A tag or ingredient row.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LabelRow {
    /// Database ID.
    pub id: i32,
    /// The label's name.
    pub name: String,
}

/// Resolve a label by `(owner, name)`, creating it if absent.
///
/// Runs on the caller's connection so it participates in the caller's
/// transaction. The insert uses `ON CONFLICT DO NOTHING`, making the
/// `(user_id, name)` constraint the authoritative guard under races: at most
/// one concurrent caller creates the row, everyone else re-reads the winner.
///
/// Name validity (non-empty, length bound) is enforced by [`Label`] at
/// construction, so no row with an invalid name can be requested here.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn resolve_or_create<K: LabelKind>(
    conn: &mut PgConnection,
    owner: UserId,
    name: &Label,
) -> Result<LabelRow, RepositoryError> {
    let select = format!(
        "SELECT id, name FROM {} WHERE user_id = $1 AND name = $2",
        K::TABLE
    );

    if let Some(row) = sqlx::query_as::<_, LabelRow>(&select)
        .bind(owner)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?
    {
        return Ok(row);
    }

    let insert = format!(
        "INSERT INTO {} (user_id, name) VALUES ($1, $2)
         ON CONFLICT (user_id, name) DO NOTHING
         RETURNING id, name",
        K::TABLE
    );

    let inserted = sqlx::query_as::<_, LabelRow>(&insert)
        .bind(owner)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;

    match inserted {
        Some(row) => Ok(row),
        // Lost the creation race; the winner's row is authoritative.
        None => Ok(sqlx::query_as::<_, LabelRow>(&select)
            .bind(owner)
            .bind(name)
            .fetch_one(&mut *conn)
            .await?),
    }
}

/// Repository for tag/ingredient operations outside recipe reconciliation.
pub struct LabelRepository<'a, K: LabelKind> {
    pool: &'a PgPool,
    _kind: PhantomData<K>,
}

impl<'a, K: LabelKind> LabelRepository<'a, K> {
    /// Create a new label repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }

    /// List the owner's labels, ordered by name descending.
    ///
    /// With `assigned_only`, restricts to labels referenced by at least one
    /// of the owner's recipes. The projection is `DISTINCT`: a label linked
    /// to several recipes still appears exactly once.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        owner: UserId,
        assigned_only: bool,
    ) -> Result<Vec<LabelRow>, RepositoryError> {
        let sql = if assigned_only {
            format!(
                "SELECT DISTINCT l.id, l.name FROM {table} l
                 JOIN {join} j ON j.{col} = l.id
                 WHERE l.user_id = $1
                 ORDER BY l.name DESC, l.id DESC",
                table = K::TABLE,
                join = K::JOIN_TABLE,
                col = K::JOIN_COLUMN,
            )
        } else {
            format!(
                "SELECT id, name FROM {} WHERE user_id = $1 ORDER BY name DESC, id DESC",
                K::TABLE
            )
        };

        Ok(sqlx::query_as::<_, LabelRow>(&sql)
            .bind(owner)
            .fetch_all(self.pool)
            .await?)
    }

    /// Create a label for the owner, returning the existing row if the name
    /// is already taken. Explicit creation shares the get-or-create path so
    /// repeated requests for the same name stay idempotent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create(&self, owner: UserId, name: &Label) -> Result<LabelRow, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        resolve_or_create::<K>(&mut *conn, owner, name).await
    }

    /// Rename an owner's label.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id does not resolve to a
    /// label owned by `owner`.
    /// Returns `RepositoryError::Conflict` if the owner already has a label
    /// with the new name.
    pub async fn rename(
        &self,
        owner: UserId,
        id: i32,
        name: &Label,
    ) -> Result<LabelRow, RepositoryError> {
        let sql = format!(
            "UPDATE {} SET name = $3 WHERE id = $1 AND user_id = $2 RETURNING id, name",
            K::TABLE
        );

        sqlx::query_as::<_, LabelRow>(&sql)
            .bind(id)
            .bind(owner)
            .bind(name)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| super::conflict_on_unique(e, &format!("{} name already exists", K::NOUN)))?
            .ok_or(RepositoryError::NotFound)
    }

    /// Delete an owner's label, detaching it from any recipes (join rows
    /// cascade; the recipes themselves are untouched).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id does not resolve to a
    /// label owned by `owner`.
    pub async fn delete(&self, owner: UserId, id: i32) -> Result<(), RepositoryError> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND user_id = $2", K::TABLE);

        let result = sqlx::query(&sql)
            .bind(id)
            .bind(owner)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
