//! Serving-size scaling.
//!
//! A recipe's ingredient amounts are stated for `recipe.servings` portions.
//! Cooking a different number of portions multiplies every present amount by
//! `desired / servings`. Desired counts of zero or below are not rejected; they
//! scale amounts to zero or below.

use serde::{Deserialize, Serialize};

use crate::models::{Ingredient, Recipe};

/// An ingredient with its amount scaled for a serving count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ScaledIngredient {
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

/// A recipe together with its ingredients scaled to `servings`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct ScaledRecipe {
    pub recipe: Recipe,
    /// Serving count the ingredients were scaled to.
    pub servings: i32,
    pub multiplier: f64,
    pub ingredients: Vec<ScaledIngredient>,
}

/// Round to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Ratio of desired to base servings. A base of zero yields 1, and an absent
/// desired count means "as written".
pub fn multiplier(desired: Option<i32>, base_servings: i32) -> f64 {
    if base_servings == 0 {
        return 1.0;
    }
    let desired = desired.unwrap_or(base_servings);
    f64::from(desired) / f64::from(base_servings)
}

/// Scale one ingredient. Absent amounts stay absent.
pub fn scale(ingredient: &Ingredient, multiplier: f64) -> ScaledIngredient {
    ScaledIngredient {
        name: ingredient.name.clone(),
        amount: ingredient.amount.map(|a| round2(a * multiplier)),
        unit: ingredient.unit.clone(),
    }
}

/// Scale every ingredient of `recipe` to `desired` servings (default: as written).
pub fn scale_recipe(recipe: Recipe, desired: Option<i32>) -> ScaledRecipe {
    let servings = desired.unwrap_or(recipe.servings);
    let multiplier = multiplier(Some(servings), recipe.servings);
    let ingredients = recipe
        .ingredients
        .iter()
        .map(|i| scale(i, multiplier))
        .collect();

    ScaledRecipe {
        recipe,
        servings,
        multiplier,
        ingredients,
    }
}
