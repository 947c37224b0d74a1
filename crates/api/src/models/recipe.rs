//! Recipe domain types and mutation payloads.
//!
//! The payload types preserve the distinction between a key that is absent
//! and a key that is present with an empty value: `tags: None` means "leave
//! the association set alone", `tags: Some(vec![])` means "clear it". Serde's
//! `Option` + `#[serde(default)]` models exactly that three-state field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ladle_core::{IngredientId, Label, Price, RecipeId, TagId, UserId};

/// A tag attached to (or attachable to) recipes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    /// Unique tag ID.
    pub id: TagId,
    /// The tag's name, unique per owner.
    pub name: String,
}

/// An ingredient. Same shape as [`Tag`], independent namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    /// Unique ingredient ID.
    pub id: IngredientId,
    /// The ingredient's name, unique per owner.
    pub name: String,
}

/// A recipe aggregate: scalars plus its tag and ingredient sets.
#[derive(Debug, Clone)]
pub struct Recipe {
    /// Unique recipe ID.
    pub id: RecipeId,
    /// Owning user. Immutable through the public update surface.
    pub owner: UserId,
    /// Recipe title.
    pub title: String,
    /// Free-form description (empty string when unset).
    pub description: String,
    /// Preparation time in minutes, non-negative.
    pub time_minutes: i32,
    /// Price, constrained by [`Price`].
    pub price: Price,
    /// Optional reference link (empty string when unset).
    pub link: String,
    /// Stored image file name, if an image has been attached.
    pub image_path: Option<String>,
    /// Tags attached to this recipe.
    pub tags: Vec<Tag>,
    /// Ingredients attached to this recipe.
    pub ingredients: Vec<Ingredient>,
    /// When the recipe was created.
    pub created_at: DateTime<Utc>,
    /// When the recipe was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A nested tag or ingredient spec: `{"name": "Thai"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LabelInput {
    /// The requested name; resolved to an existing or new entity per owner.
    pub name: Label,
}

/// Payload for `POST /api/recipes` and `PUT /api/recipes/{id}`.
///
/// Required scalars are plain fields, so a body missing any of them is
/// rejected at deserialization before any database work. Any `user` or
/// `owner` key in the body is simply ignored; ownership always comes from
/// the authenticated caller.
#[derive(Debug, Deserialize)]
pub struct RecipeWrite {
    /// Recipe title (required).
    pub title: String,
    /// Preparation time in minutes (required).
    pub time_minutes: i32,
    /// Price (required).
    pub price: Price,
    /// Description; defaults to empty.
    #[serde(default)]
    pub description: String,
    /// Reference link; defaults to empty.
    #[serde(default)]
    pub link: String,
    /// Nested tag specs. Absent and empty are equivalent on create.
    #[serde(default)]
    pub tags: Option<Vec<LabelInput>>,
    /// Nested ingredient specs.
    #[serde(default)]
    pub ingredients: Option<Vec<LabelInput>>,
}

/// Payload for `PATCH /api/recipes/{id}`; also the internal form a full
/// update is lowered into (with every scalar present).
#[derive(Debug, Default, Deserialize)]
pub struct RecipePatch {
    /// New title, if present.
    pub title: Option<String>,
    /// New preparation time, if present.
    pub time_minutes: Option<i32>,
    /// New price, if present.
    pub price: Option<Price>,
    /// New description, if present.
    pub description: Option<String>,
    /// New link, if present.
    pub link: Option<String>,
    /// Desired tag set. `None` leaves associations untouched;
    /// `Some(vec![])` clears them.
    #[serde(default)]
    pub tags: Option<Vec<LabelInput>>,
    /// Desired ingredient set, same semantics as `tags`.
    #[serde(default)]
    pub ingredients: Option<Vec<LabelInput>>,
}

/// Scalar-field validation failures not already covered by the core types.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Title is empty.
    #[error("title cannot be empty")]
    EmptyTitle,
    /// Title exceeds the column bound.
    #[error("title must be at most 255 characters")]
    TitleTooLong,
    /// Link exceeds the column bound.
    #[error("link must be at most 255 characters")]
    LinkTooLong,
    /// Preparation time is negative.
    #[error("time_minutes cannot be negative")]
    NegativeTime,
}

const MAX_VARCHAR: usize = 255;

fn check_title(title: &str) -> Result<(), PayloadError> {
    if title.is_empty() {
        return Err(PayloadError::EmptyTitle);
    }
    if title.chars().count() > MAX_VARCHAR {
        return Err(PayloadError::TitleTooLong);
    }
    Ok(())
}

fn check_link(link: &str) -> Result<(), PayloadError> {
    if link.chars().count() > MAX_VARCHAR {
        return Err(PayloadError::LinkTooLong);
    }
    Ok(())
}

impl RecipeWrite {
    /// Validate the scalar fields.
    ///
    /// Prices and label names are validated by their types at
    /// deserialization; this covers the plain-string and integer fields.
    ///
    /// # Errors
    ///
    /// Returns the first [`PayloadError`] encountered.
    pub fn validate(&self) -> Result<(), PayloadError> {
        check_title(&self.title)?;
        check_link(&self.link)?;
        if self.time_minutes < 0 {
            return Err(PayloadError::NegativeTime);
        }
        Ok(())
    }
}

impl RecipePatch {
    /// Validate whichever scalar fields are present.
    ///
    /// # Errors
    ///
    /// Returns the first [`PayloadError`] encountered.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if let Some(title) = &self.title {
            check_title(title)?;
        }
        if let Some(link) = &self.link {
            check_link(link)?;
        }
        if matches!(self.time_minutes, Some(t) if t < 0) {
            return Err(PayloadError::NegativeTime);
        }
        Ok(())
    }
}

impl From<RecipeWrite> for RecipePatch {
    /// Lower a full update into a patch with every scalar present. Absent
    /// `tags`/`ingredients` stay absent: a full update that omits them
    /// leaves the association sets untouched.
    fn from(write: RecipeWrite) -> Self {
        Self {
            title: Some(write.title),
            time_minutes: Some(write.time_minutes),
            price: Some(write.price),
            description: Some(write.description),
            link: Some(write.link),
            tags: write.tags,
            ingredients: write.ingredients,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_distinguishes_absent_from_empty() {
        let patch: RecipePatch = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert!(patch.tags.is_none());
        assert!(patch.ingredients.is_none());

        let patch: RecipePatch = serde_json::from_str(r#"{"tags": []}"#).unwrap();
        assert_eq!(patch.tags.map(|t| t.len()), Some(0));
        assert!(patch.ingredients.is_none());

        let patch: RecipePatch = serde_json::from_str(r#"{"tags": [{"name": "X"}]}"#).unwrap();
        let tags = patch.tags.unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.first().unwrap().name.as_str(), "X");
    }

    #[test]
    fn test_patch_ignores_owner_keys() {
        // The owner always comes from the authenticated caller; user/owner
        // keys in the body deserialize to nothing.
        let patch: RecipePatch =
            serde_json::from_str(r#"{"user": 999, "owner": 999, "title": "t"}"#).unwrap();
        assert_eq!(patch.title.as_deref(), Some("t"));
    }

    #[test]
    fn test_write_requires_scalars() {
        let missing_price = r#"{"title": "Curry", "time_minutes": 30}"#;
        assert!(serde_json::from_str::<RecipeWrite>(missing_price).is_err());

        let complete = r#"{"title": "Curry", "time_minutes": 30, "price": "2.50"}"#;
        let write: RecipeWrite = serde_json::from_str(complete).unwrap();
        assert_eq!(write.description, "");
        assert!(write.tags.is_none());
    }

    #[test]
    fn test_write_rejects_bad_nested_names() {
        let empty_name = r#"{"title": "t", "time_minutes": 1, "price": "1.00",
                             "tags": [{"name": ""}]}"#;
        assert!(serde_json::from_str::<RecipeWrite>(empty_name).is_err());
    }

    #[test]
    fn test_validate_scalars() {
        let mut patch = RecipePatch {
            title: Some(String::new()),
            ..RecipePatch::default()
        };
        assert!(matches!(patch.validate(), Err(PayloadError::EmptyTitle)));

        patch.title = Some("ok".to_owned());
        patch.time_minutes = Some(-1);
        assert!(matches!(patch.validate(), Err(PayloadError::NegativeTime)));

        patch.time_minutes = Some(0);
        patch.link = Some("x".repeat(256));
        assert!(matches!(patch.validate(), Err(PayloadError::LinkTooLong)));
    }

    #[test]
    fn test_full_update_lowers_to_patch_with_all_scalars() {
        let write: RecipeWrite = serde_json::from_str(
            r#"{"title": "Curry", "time_minutes": 30, "price": "2.50", "link": "example.com"}"#,
        )
        .unwrap();
        let patch = RecipePatch::from(write);
        assert!(patch.title.is_some());
        assert!(patch.time_minutes.is_some());
        assert!(patch.price.is_some());
        assert!(patch.description.is_some());
        assert!(patch.link.is_some());
        // Omitted association keys stay omitted.
        assert!(patch.tags.is_none());
        assert!(patch.ingredients.is_none());
    }
}
