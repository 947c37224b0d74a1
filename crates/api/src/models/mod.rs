//! Domain models for the Ladle API.
//!
//! These types represent validated domain objects and request payloads,
//! separate from database row types.

pub mod recipe;
pub mod user;

pub use recipe::{Ingredient, LabelInput, Recipe, RecipePatch, RecipeWrite, Tag};
pub use user::User;
