//! # larder-api
//!
//! HTTP surface for the larder recipe catalog: recipe CRUD, per-request
//! serving adjustment, and shopping-list aggregation.

pub mod config;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use utoipa::OpenApi;

use larder_core::RecipeRepository;

pub use config::{ServerConfig, StorageBackend};
pub use error::ApiError;

use handlers::{recipes, shopping};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<dyn RecipeRepository>,
}

impl AppState {
    pub fn new(recipes: Arc<dyn RecipeRepository>) -> Self {
        Self { recipes }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Larder API",
        description = "Recipe catalog with serving scaling and shopping-list aggregation"
    ),
    paths(
        recipes::list_all_recipes,
        recipes::list_recipes,
        recipes::create_recipe,
        recipes::get_recipe,
        recipes::update_recipe,
        recipes::delete_recipe,
        recipes::get_options,
        shopping::create_shopping_list,
    ),
    components(schemas(
        larder_core::Recipe,
        larder_core::Ingredient,
        larder_core::Category,
        larder_core::RecipeDraft,
        larder_core::IngredientInput,
        larder_core::ScaledIngredient,
        larder_core::Selection,
        larder_core::ShoppingItem,
        recipes::RecipeResponse,
        recipes::ScaledRecipeResponse,
        recipes::OptionsResponse,
        shopping::ShoppingListRequest,
        shopping::ShoppingListResponse,
    )),
    tags(
        (name = "Recipes", description = "Recipe CRUD and scaling"),
        (name = "Shopping", description = "Shopping-list aggregation")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the router with all routes and middleware.
pub fn app(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(openapi_json))
        .route("/api/recipes", get(recipes::list_all_recipes))
        .route(
            "/api/v1/recipes",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/api/v1/recipes/:id",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .delete(recipes::delete_recipe),
        )
        .route("/api/v1/options", get(recipes::get_options))
        .route("/api/v1/shopping-list", post(shopping::create_shopping_list))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}
