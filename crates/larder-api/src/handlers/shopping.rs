//! Shopping-list handler.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use larder_core::{build_shopping_list, Selection, ShoppingItem};

use crate::{ApiError, AppState};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ShoppingListRequest {
    #[serde(default)]
    pub selections: Vec<Selection>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ShoppingListResponse {
    pub items: Vec<ShoppingItem>,
}

/// Merge the scaled ingredients of the selected recipes. Unknown recipe ids
/// are ignored.
#[utoipa::path(
    post,
    path = "/api/v1/shopping-list",
    tag = "Shopping",
    request_body = ShoppingListRequest,
    responses((status = 200, description = "Aggregated shopping list", body = ShoppingListResponse))
)]
pub async fn create_shopping_list(
    State(state): State<AppState>,
    Json(req): Json<ShoppingListRequest>,
) -> Result<Json<ShoppingListResponse>, ApiError> {
    let items = build_shopping_list(state.recipes.as_ref(), &req.selections).await?;
    Ok(Json(ShoppingListResponse { items }))
}
