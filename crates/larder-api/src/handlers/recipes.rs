//! Recipe HTTP handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use larder_core::{
    scale_recipe, Category, Recipe, RecipeDraft, RecipeFilter, ScaledIngredient, SUGGESTED_UNITS,
};

use crate::{ApiError, AppState};

/// A recipe as returned by the API: every stored field plus `total_time`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeResponse {
    #[serde(flatten)]
    pub recipe: Recipe,
    /// Prep plus cook minutes.
    pub total_time: i64,
}

impl From<Recipe> for RecipeResponse {
    fn from(recipe: Recipe) -> Self {
        Self {
            total_time: recipe.total_time(),
            recipe,
        }
    }
}

/// A recipe with its ingredients scaled for a serving count.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScaledRecipeResponse {
    pub recipe: RecipeResponse,
    pub servings: i32,
    pub multiplier: f64,
    pub ingredients: Vec<ScaledIngredient>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRecipesQuery {
    /// Case-insensitive text matched against title, description and ingredient names.
    pub search: Option<String>,
    /// Category name; blank means any.
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeViewQuery {
    /// Serving count to scale to; defaults to the recipe's own.
    pub servings: Option<i32>,
}

/// Categories and suggested units offered to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OptionsResponse {
    pub categories: Vec<Category>,
    pub units: Vec<String>,
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Recipe {} not found", id))
}

/// Every recipe, oldest first.
#[utoipa::path(
    get,
    path = "/api/recipes",
    tag = "Recipes",
    responses((status = 200, description = "All recipes", body = Vec<RecipeResponse>))
)]
pub async fn list_all_recipes(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    let recipes = state.recipes.list_all().await?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

/// Recipes matching the optional search text and category, most recently
/// updated first.
#[utoipa::path(
    get,
    path = "/api/v1/recipes",
    tag = "Recipes",
    params(ListRecipesQuery),
    responses(
        (status = 200, description = "Matching recipes", body = Vec<RecipeResponse>),
        (status = 400, description = "Unknown category")
    )
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    Query(query): Query<ListRecipesQuery>,
) -> Result<Json<Vec<RecipeResponse>>, ApiError> {
    let mut filter = RecipeFilter {
        search: query.search,
        category: None,
    };
    if let Some(name) = query.category.as_deref().map(str::trim) {
        if !name.is_empty() {
            filter.category = Some(name.parse::<Category>().map_err(ApiError::BadRequest)?);
        }
    }

    let recipes = state.recipes.list_filtered(filter).await?;
    Ok(Json(recipes.into_iter().map(RecipeResponse::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    tag = "Recipes",
    request_body = RecipeDraft,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_recipe(
    State(state): State<AppState>,
    Json(draft): Json<RecipeDraft>,
) -> Result<(StatusCode, Json<RecipeResponse>), ApiError> {
    let recipe = state.recipes.create(draft).await?;
    Ok((StatusCode::CREATED, Json(recipe.into())))
}

/// One recipe, with ingredients scaled to `servings` when given.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    tag = "Recipes",
    params(("id" = Uuid, Path, description = "Recipe id"), RecipeViewQuery),
    responses(
        (status = 200, description = "Recipe with scaled ingredients", body = ScaledRecipeResponse),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<RecipeViewQuery>,
) -> Result<Json<ScaledRecipeResponse>, ApiError> {
    let recipe = state.recipes.get(id).await?.ok_or_else(|| not_found(id))?;

    let scaled = scale_recipe(recipe, query.servings);
    Ok(Json(ScaledRecipeResponse {
        recipe: scaled.recipe.into(),
        servings: scaled.servings,
        multiplier: scaled.multiplier,
        ingredients: scaled.ingredients,
    }))
}

/// Replace every field and the ingredient list of a recipe.
#[utoipa::path(
    put,
    path = "/api/v1/recipes/{id}",
    tag = "Recipes",
    params(("id" = Uuid, Path, description = "Recipe id")),
    request_body = RecipeDraft,
    responses(
        (status = 200, description = "Updated recipe", body = RecipeResponse),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(draft): Json<RecipeDraft>,
) -> Result<Json<RecipeResponse>, ApiError> {
    state.recipes.update(id, draft).await?;

    // A concurrent delete can land between the two calls.
    let recipe = state.recipes.get(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(recipe.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}",
    tag = "Recipes",
    params(("id" = Uuid, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe and its ingredients deleted"),
        (status = 404, description = "Recipe not found")
    )
)]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.recipes.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/options",
    tag = "Recipes",
    responses(
        (status = 200, description = "Categories and suggested units", body = OptionsResponse)
    )
)]
pub async fn get_options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        categories: Category::ALL.to_vec(),
        units: SUGGESTED_UNITS.iter().map(|u| u.to_string()).collect(),
    })
}
