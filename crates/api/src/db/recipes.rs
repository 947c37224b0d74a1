//! Recipe repository: the aggregate manager.
//!
//! A recipe together with its tag and ingredient sets is one consistency
//! boundary. Every mutation here runs in a single transaction, so scalar
//! changes and association changes commit together or not at all.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use ladle_core::{IngredientId, Price, RecipeId, TagId, UserId};

use super::labels::{Ingredients, LabelKind, LabelRow, Tags, resolve_or_create};
use super::RepositoryError;
use crate::models::recipe::{Ingredient, LabelInput, Recipe, RecipePatch, RecipeWrite, Tag};

/// Repository for recipe aggregate operations.
pub struct RecipeRepository<'a> {
    pool: &'a PgPool,
}

#[derive(sqlx::FromRow)]
struct RecipeRow {
    id: i32,
    user_id: UserId,
    title: String,
    description: String,
    time_minutes: i32,
    price: Price,
    link: String,
    image_path: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    recipe_id: i32,
    id: i32,
    name: String,
}

const RECIPE_COLUMNS: &str =
    "id, user_id, title, description, time_minutes, price, link, image_path, \
     created_at, updated_at";

impl<'a> RecipeRepository<'a> {
    /// Create a new recipe repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the owner's recipes, newest first (id descending), with their
    /// association sets attached.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, owner: UserId) -> Result<Vec<Recipe>, RepositoryError> {
        let rows = sqlx::query_as::<_, RecipeRow>(&format!(
            "SELECT {RECIPE_COLUMNS} FROM recipe WHERE user_id = $1 ORDER BY id DESC"
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        let mut tags = self.links_for_owner::<Tags>(owner).await?;
        let mut ingredients = self.links_for_owner::<Ingredients>(owner).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let tag_rows = tags.remove(&row.id).unwrap_or_default();
                let ingredient_rows = ingredients.remove(&row.id).unwrap_or_default();
                assemble(row, tag_rows, ingredient_rows)
            })
            .collect())
    }

    /// Get one of the owner's recipes by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id does not resolve to a
    /// recipe owned by `owner` - whether it belongs to someone else or does
    /// not exist at all.
    pub async fn get(&self, owner: UserId, id: RecipeId) -> Result<Recipe, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        let row = fetch_owned(&mut *conn, owner, id, false).await?;
        let tags = links_for_recipe::<Tags>(&mut *conn, id).await?;
        let ingredients = links_for_recipe::<Ingredients>(&mut *conn, id).await?;

        Ok(assemble(row, tags, ingredients))
    }

    /// Create a recipe for `owner`, resolving and attaching any nested tag
    /// and ingredient specs.
    ///
    /// The owner is always the authenticated caller; nothing in the payload
    /// can designate a different one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails; the transaction
    /// rolls back and nothing is persisted.
    pub async fn create(&self, owner: UserId, write: RecipeWrite) -> Result<Recipe, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "INSERT INTO recipe (user_id, title, description, time_minutes, price, link)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(owner)
        .bind(&write.title)
        .bind(&write.description)
        .bind(write.time_minutes)
        .bind(write.price)
        .bind(&write.link)
        .fetch_one(&mut *tx)
        .await?;

        let id = RecipeId::new(row.id);
        let tags = match &write.tags {
            Some(specs) => reconcile::<Tags>(&mut tx, owner, id, specs).await?,
            None => Vec::new(),
        };
        let ingredients = match &write.ingredients {
            Some(specs) => reconcile::<Ingredients>(&mut tx, owner, id, specs).await?,
            None => Vec::new(),
        };

        tx.commit().await?;

        Ok(assemble(row, tags, ingredients))
    }

    /// Apply a patch to one of the owner's recipes.
    ///
    /// Present scalar fields replace stored values; absent ones are kept.
    /// For each of `tags`/`ingredients`: an absent key leaves the
    /// association set untouched, a present key (empty list included)
    /// replaces the set with the resolved entities, exactly.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` under the same non-leaking
    /// semantics as [`Self::get`]; the stored state is unchanged on any
    /// error (transaction rollback).
    pub async fn update(
        &self,
        owner: UserId,
        id: RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = fetch_owned(&mut *tx, owner, id, true).await?;

        let title = patch.title.unwrap_or(current.title);
        let description = patch.description.unwrap_or(current.description);
        let time_minutes = patch.time_minutes.unwrap_or(current.time_minutes);
        let price = patch.price.unwrap_or(current.price);
        let link = patch.link.unwrap_or(current.link);

        let row = sqlx::query_as::<_, RecipeRow>(&format!(
            "UPDATE recipe
             SET title = $3, description = $4, time_minutes = $5, price = $6, link = $7,
                 updated_at = now()
             WHERE id = $1 AND user_id = $2
             RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .bind(&title)
        .bind(&description)
        .bind(time_minutes)
        .bind(price)
        .bind(&link)
        .fetch_one(&mut *tx)
        .await?;

        let tags = match &patch.tags {
            Some(specs) => reconcile::<Tags>(&mut tx, owner, id, specs).await?,
            None => links_for_recipe::<Tags>(&mut *tx, id).await?,
        };
        let ingredients = match &patch.ingredients {
            Some(specs) => reconcile::<Ingredients>(&mut tx, owner, id, specs).await?,
            None => links_for_recipe::<Ingredients>(&mut *tx, id).await?,
        };

        tx.commit().await?;

        Ok(assemble(row, tags, ingredients))
    }

    /// Delete one of the owner's recipes, returning the stored image file
    /// name (if any) so the caller can release the binary. Join rows
    /// cascade; the tags and ingredients themselves survive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` under the same non-leaking
    /// semantics as [`Self::get`].
    pub async fn delete(
        &self,
        owner: UserId,
        id: RecipeId,
    ) -> Result<Option<String>, RepositoryError> {
        let deleted: Option<(Option<String>,)> = sqlx::query_as(
            "DELETE FROM recipe WHERE id = $1 AND user_id = $2 RETURNING image_path",
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(self.pool)
        .await?;

        deleted.map(|(path,)| path).ok_or(RepositoryError::NotFound)
    }

    /// Record a newly stored image for one of the owner's recipes, returning
    /// the previously stored file name (if any) so the caller can release it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` under the same non-leaking
    /// semantics as [`Self::get`].
    pub async fn set_image(
        &self,
        owner: UserId,
        id: RecipeId,
        image_path: &str,
    ) -> Result<Option<String>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let current = fetch_owned(&mut *tx, owner, id, true).await?;

        sqlx::query("UPDATE recipe SET image_path = $3, updated_at = now() WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .bind(image_path)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(current.image_path)
    }

    async fn links_for_owner<K: LabelKind>(
        &self,
        owner: UserId,
    ) -> Result<HashMap<i32, Vec<LabelRow>>, RepositoryError> {
        let rows = sqlx::query_as::<_, LinkRow>(&format!(
            "SELECT j.recipe_id, l.id, l.name
             FROM {join} j
             JOIN {table} l ON l.id = j.{col}
             WHERE l.user_id = $1
             ORDER BY l.name, l.id",
            join = K::JOIN_TABLE,
            table = K::TABLE,
            col = K::JOIN_COLUMN,
        ))
        .bind(owner)
        .fetch_all(self.pool)
        .await?;

        let mut by_recipe: HashMap<i32, Vec<LabelRow>> = HashMap::new();
        for row in rows {
            by_recipe.entry(row.recipe_id).or_default().push(LabelRow {
                id: row.id,
                name: row.name,
            });
        }
        Ok(by_recipe)
    }
}

/// Fetch a recipe scoped by owner, optionally locking the row for the rest
/// of the transaction.
async fn fetch_owned(
    conn: &mut PgConnection,
    owner: UserId,
    id: RecipeId,
    for_update: bool,
) -> Result<RecipeRow, RepositoryError> {
    let suffix = if for_update { " FOR UPDATE" } else { "" };

    sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipe WHERE id = $1 AND user_id = $2{suffix}"
    ))
    .bind(id)
    .bind(owner)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(RepositoryError::NotFound)
}

/// Replace a recipe's association set with the entities resolved from
/// `specs`, creating missing ones on demand via the label repository.
///
/// After this returns, the stored set equals the resolved set exactly: no
/// stale links survive, and a name repeated in the payload attaches once.
async fn reconcile<K: LabelKind>(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    owner: UserId,
    recipe: RecipeId,
    specs: &[LabelInput],
) -> Result<Vec<LabelRow>, RepositoryError> {
    let mut resolved: BTreeMap<i32, LabelRow> = BTreeMap::new();
    for spec in specs {
        let row = resolve_or_create::<K>(&mut **tx, owner, &spec.name).await?;
        resolved.insert(row.id, row);
    }

    sqlx::query(&format!(
        "DELETE FROM {} WHERE recipe_id = $1",
        K::JOIN_TABLE
    ))
    .bind(recipe)
    .execute(&mut **tx)
    .await?;

    let insert = format!(
        "INSERT INTO {} (recipe_id, {}) VALUES ($1, $2)",
        K::JOIN_TABLE,
        K::JOIN_COLUMN
    );
    for id in resolved.keys() {
        sqlx::query(&insert)
            .bind(recipe)
            .bind(id)
            .execute(&mut **tx)
            .await?;
    }

    let mut rows: Vec<LabelRow> = resolved.into_values().collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(rows)
}

/// Load a recipe's current association rows, name-ordered.
async fn links_for_recipe<K: LabelKind>(
    conn: &mut PgConnection,
    recipe: RecipeId,
) -> Result<Vec<LabelRow>, RepositoryError> {
    Ok(sqlx::query_as::<_, LabelRow>(&format!(
        "SELECT l.id, l.name
         FROM {join} j
         JOIN {table} l ON l.id = j.{col}
         WHERE j.recipe_id = $1
         ORDER BY l.name, l.id",
        join = K::JOIN_TABLE,
        table = K::TABLE,
        col = K::JOIN_COLUMN,
    ))
    .bind(recipe)
    .fetch_all(&mut *conn)
    .await?)
}

fn assemble(row: RecipeRow, tags: Vec<LabelRow>, ingredients: Vec<LabelRow>) -> Recipe {
    Recipe {
        id: RecipeId::new(row.id),
        owner: row.user_id,
        title: row.title,
        description: row.description,
        time_minutes: row.time_minutes,
        price: row.price,
        link: row.link,
        image_path: row.image_path,
        tags: tags
            .into_iter()
            .map(|l| Tag {
                id: TagId::new(l.id),
                name: l.name,
            })
            .collect(),
        ingredients: ingredients
            .into_iter()
            .map(|l| Ingredient {
                id: IngredientId::new(l.id),
                name: l.name,
            })
            .collect(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}
