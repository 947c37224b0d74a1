//! Recipe endpoints.
//!
//! Every handler takes the authenticated user from [`RequireUser`] and
//! passes the owner down explicitly; a recipe id that does not resolve
//! within the caller's own rows is a 404, whether it exists for another
//! user or not at all.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Serialize;
use serde_json::{Value, json};

use ladle_core::{Price, RecipeId};

use crate::db::RecipeRepository;
use crate::error::{AppError, AppJson, Result};
use crate::middleware::RequireUser;
use crate::models::recipe::{Ingredient, Recipe, RecipePatch, RecipeWrite, Tag};
use crate::services::ImageStore;
use crate::state::AppState;

/// Recipe as returned by the list endpoint: scalars plus associations,
/// without the description body.
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    id: RecipeId,
    title: String,
    time_minutes: i32,
    price: Price,
    link: String,
    tags: Vec<Tag>,
    ingredients: Vec<Ingredient>,
}

/// Recipe as returned by the detail and mutation endpoints.
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    id: RecipeId,
    title: String,
    description: String,
    time_minutes: i32,
    price: Price,
    link: String,
    tags: Vec<Tag>,
    ingredients: Vec<Ingredient>,
    image: Option<String>,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: recipe.tags,
            ingredients: recipe.ingredients,
        }
    }
}

impl From<Recipe> for RecipeDetail {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.id,
            title: recipe.title,
            description: recipe.description,
            time_minutes: recipe.time_minutes,
            price: recipe.price,
            link: recipe.link,
            tags: recipe.tags,
            ingredients: recipe.ingredients,
            image: recipe.image_path.as_deref().map(ImageStore::url),
        }
    }
}

/// GET /api/recipes - list the caller's recipes, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<RecipeSummary>>> {
    let recipes = RecipeRepository::new(state.pool()).list(user.id).await?;

    Ok(Json(recipes.into_iter().map(RecipeSummary::from).collect()))
}

/// POST /api/recipes - create a recipe owned by the caller.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    AppJson(write): AppJson<RecipeWrite>,
) -> Result<(StatusCode, Json<RecipeDetail>)> {
    write.validate()?;

    let recipe = RecipeRepository::new(state.pool())
        .create(user.id, write)
        .await?;

    Ok((StatusCode::CREATED, Json(recipe.into())))
}

/// GET /api/recipes/{id} - recipe detail.
pub async fn detail(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<RecipeId>,
) -> Result<Json<RecipeDetail>> {
    let recipe = RecipeRepository::new(state.pool()).get(user.id, id).await?;

    Ok(Json(recipe.into()))
}

/// PATCH /api/recipes/{id} - partial update.
pub async fn update_partial(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<RecipeId>,
    AppJson(patch): AppJson<RecipePatch>,
) -> Result<Json<RecipeDetail>> {
    patch.validate()?;

    let recipe = RecipeRepository::new(state.pool())
        .update(user.id, id, patch)
        .await?;

    Ok(Json(recipe.into()))
}

/// PUT /api/recipes/{id} - full update. Every scalar must be present in the
/// payload; omitted association keys leave the stored sets untouched.
pub async fn update_full(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<RecipeId>,
    AppJson(write): AppJson<RecipeWrite>,
) -> Result<Json<RecipeDetail>> {
    write.validate()?;

    let recipe = RecipeRepository::new(state.pool())
        .update(user.id, id, RecipePatch::from(write))
        .await?;

    Ok(Json(recipe.into()))
}

/// DELETE /api/recipes/{id} - delete a recipe and release its image.
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<RecipeId>,
) -> Result<StatusCode> {
    let old_image = RecipeRepository::new(state.pool())
        .delete(user.id, id)
        .await?;

    if let Some(file_name) = old_image {
        state.images().remove(&file_name).await;
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/image - attach or replace the recipe's image.
///
/// Expects a multipart body with an `image` field. The bytes are fully
/// validated before anything is stored; on success the previously stored
/// binary (if any) is released.
pub async fn upload_image(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<RecipeId>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    let repo = RecipeRepository::new(state.pool());

    // Resolve ownership before touching the body or the filesystem.
    repo.get(user.id, id).await?;

    let bytes = read_image_field(&mut multipart).await?;

    let file_name = state.images().save(id, &bytes).await?;

    let old_image = match repo.set_image(user.id, id, &file_name).await {
        Ok(old) => old,
        Err(e) => {
            // Recipe vanished between the ownership check and the update;
            // don't leave the fresh binary orphaned.
            state.images().remove(&file_name).await;
            return Err(e.into());
        }
    };

    if let Some(old) = old_image {
        state.images().remove(&old).await;
    }

    Ok(Json(json!({
        "id": id,
        "image": ImageStore::url(&file_name),
    })))
}

/// Pull the `image` field's bytes out of a multipart body.
async fn read_image_field(multipart: &mut Multipart) -> Result<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        if field.name() == Some("image") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(e.to_string()))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(AppError::Validation(
        "multipart field `image` is required".to_owned(),
    ))
}
