//! HTTP route handlers for the recipe API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                  - Liveness check
//! GET    /health/ready            - Readiness check (database ping)
//! GET    /media/{file}            - Stored recipe images
//!
//! # Recipes (requires token auth)
//! GET    /api/recipes             - List the caller's recipes
//! POST   /api/recipes             - Create a recipe
//! GET    /api/recipes/{id}        - Recipe detail
//! PUT    /api/recipes/{id}        - Full update
//! PATCH  /api/recipes/{id}        - Partial update
//! DELETE /api/recipes/{id}        - Delete
//! POST   /api/recipes/{id}/image  - Attach or replace the image
//!
//! # Tags (requires token auth)
//! GET    /api/tags                - List (?assigned_only=1 to filter)
//! POST   /api/tags                - Create
//! PATCH  /api/tags/{id}           - Rename
//! DELETE /api/tags/{id}           - Delete
//!
//! # Ingredients - same surface as tags, under /api/ingredients
//! ```

pub mod labels;
pub mod recipes;

use axum::{
    Router,
    routing::{get, patch},
};

use crate::db::labels::{Ingredients, LabelKind, Tags};
use crate::state::AppState;

/// Create the recipe routes router.
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(recipes::list).post(recipes::create))
        .route(
            "/{id}",
            get(recipes::detail)
                .put(recipes::update_full)
                .patch(recipes::update_partial)
                .delete(recipes::remove),
        )
        .route("/{id}/image", axum::routing::post(recipes::upload_image))
}

/// Create a label routes router for one label kind.
pub fn label_routes<K: LabelKind>() -> Router<AppState> {
    Router::new()
        .route("/", get(labels::list::<K>).post(labels::create::<K>))
        .route(
            "/{id}",
            patch(labels::rename::<K>).delete(labels::remove::<K>),
        )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/recipes", recipe_routes())
        .nest("/api/tags", label_routes::<Tags>())
        .nest("/api/ingredients", label_routes::<Ingredients>())
}
