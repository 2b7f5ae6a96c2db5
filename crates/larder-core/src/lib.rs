//! # larder-core
//!
//! Core types, traits, and algorithms for the larder recipe catalog.
//!
//! This crate provides the recipe and ingredient entities, input validation,
//! serving-size scaling, shopping-list aggregation, and the
//! [`RecipeRepository`] trait that storage crates implement.

pub mod draft;
pub mod error;
pub mod memory;
pub mod models;
pub mod scaling;
pub mod shopping;
pub mod traits;

// Re-export commonly used types at crate root
pub use draft::{AmountInput, IngredientInput, NewIngredient, NewRecipe, RecipeDraft};
pub use error::{Error, Result};
pub use memory::InMemoryRecipeRepository;
pub use models::*;
pub use scaling::{multiplier, round2, scale, scale_recipe, ScaledIngredient, ScaledRecipe};
pub use shopping::{
    build_shopping_list, Selection, ShoppingItem, ShoppingListBuilder, DEFAULT_SELECTION_SERVINGS,
};
pub use traits::*;
