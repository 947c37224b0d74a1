//! Tag and ingredient endpoints.
//!
//! One set of handlers, generic over [`LabelKind`]; the router instantiates
//! them once for tags and once for ingredients.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::db::labels::{LabelKind, LabelRepository, LabelRow};
use crate::error::{AppJson, Result};
use crate::middleware::RequireUser;
use crate::models::recipe::LabelInput;
use crate::state::AppState;

/// Tag or ingredient as serialized by every label endpoint.
#[derive(Debug, Serialize)]
pub struct LabelDto {
    id: i32,
    name: String,
}

impl From<LabelRow> for LabelDto {
    fn from(row: LabelRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

/// Query parameters for label listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// `assigned_only=1` restricts the listing to labels attached to at
    /// least one of the caller's recipes.
    #[serde(default)]
    assigned_only: Option<u8>,
}

/// GET /api/tags, GET /api/ingredients - list the caller's labels, name
/// descending.
pub async fn list<K: LabelKind>(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<LabelDto>>> {
    let assigned_only = params.assigned_only.unwrap_or(0) != 0;

    let rows = LabelRepository::<K>::new(state.pool())
        .list(user.id, assigned_only)
        .await?;

    Ok(Json(rows.into_iter().map(LabelDto::from).collect()))
}

/// POST /api/tags, POST /api/ingredients - create a label (or return the
/// caller's existing one with that name).
pub async fn create<K: LabelKind>(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    AppJson(input): AppJson<LabelInput>,
) -> Result<(StatusCode, Json<LabelDto>)> {
    let row = LabelRepository::<K>::new(state.pool())
        .create(user.id, &input.name)
        .await?;

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// PATCH /api/tags/{id}, PATCH /api/ingredients/{id} - rename a label.
pub async fn rename<K: LabelKind>(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
    AppJson(input): AppJson<LabelInput>,
) -> Result<Json<LabelDto>> {
    let row = LabelRepository::<K>::new(state.pool())
        .rename(user.id, id, &input.name)
        .await?;

    Ok(Json(row.into()))
}

/// DELETE /api/tags/{id}, DELETE /api/ingredients/{id} - delete a label,
/// detaching it from any recipes.
pub async fn remove<K: LabelKind>(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<i32>,
) -> Result<StatusCode> {
    LabelRepository::<K>::new(state.pool())
        .delete(user.id, id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
