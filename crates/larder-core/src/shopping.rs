//! Shopping-list aggregation across several recipes.
//!
//! Ingredients are merged on the key `(lowercased name, unit or "")`. The unit
//! half of the key is compared exactly, so "cup" and "Cup" stay separate. The
//! first ingredient seen under a key fixes the displayed name and unit; later
//! ones add to the total and append their recipe title to the provenance list.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use uuid::Uuid;

use crate::error::Result;
use crate::models::Recipe;
use crate::scaling::multiplier;
use crate::traits::RecipeRepository;

/// Servings assumed for a selection that does not name a count.
pub const DEFAULT_SELECTION_SERVINGS: i32 = 4;

/// A recipe picked for the shopping list, with the portions to cook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Selection {
    pub recipe_id: Uuid,
    /// Defaults to 4 when absent.
    #[serde(default)]
    pub servings: Option<i32>,
}

impl Selection {
    pub fn new(recipe_id: Uuid, servings: i32) -> Self {
        Self {
            recipe_id,
            servings: Some(servings),
        }
    }

    pub fn desired_servings(&self) -> i32 {
        self.servings.unwrap_or(DEFAULT_SELECTION_SERVINGS)
    }
}

/// One merged line of the shopping list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ShoppingItem {
    pub name: String,
    /// Sum of scaled amounts; ingredients without an amount add nothing.
    pub amount: f64,
    /// Unit of the first occurrence, `""` when it had none.
    pub unit: String,
    /// Titles of the recipes that contributed, in contribution order.
    pub recipes: Vec<String>,
}

/// Accumulates scaled ingredients from recipes into shopping items.
#[derive(Debug, Default)]
pub struct ShoppingListBuilder {
    index: HashMap<(String, String), usize>,
    items: Vec<ShoppingItem>,
}

impl ShoppingListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add every ingredient of `recipe`, scaled to `desired_servings`.
    pub fn add_recipe(&mut self, recipe: &Recipe, desired_servings: i32) -> &mut Self {
        let m = multiplier(Some(desired_servings), recipe.servings);

        for ingredient in &recipe.ingredients {
            let unit = ingredient.unit.clone().unwrap_or_default();
            let key = (ingredient.name.to_lowercase(), unit);
            let scaled = ingredient.amount.unwrap_or(0.0) * m;

            match self.index.get(&key) {
                Some(&pos) => {
                    let item = &mut self.items[pos];
                    item.amount += scaled;
                    item.recipes.push(recipe.title.clone());
                }
                None => {
                    trace!(name = %ingredient.name, unit = %key.1, "New shopping item");
                    self.index.insert(key.clone(), self.items.len());
                    self.items.push(ShoppingItem {
                        name: ingredient.name.clone(),
                        amount: scaled,
                        unit: key.1,
                        recipes: vec![recipe.title.clone()],
                    });
                }
            }
        }
        self
    }

    /// Number of distinct items so far.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items sorted by case-insensitive name; ties keep insertion order.
    pub fn build(self) -> Vec<ShoppingItem> {
        let mut items = self.items;
        items.sort_by_cached_key(|item| item.name.to_lowercase());
        items
    }
}

/// Resolve each selection through `repo` and merge the scaled ingredients.
///
/// Unknown recipe ids are skipped. Repository errors propagate.
pub async fn build_shopping_list(
    repo: &dyn RecipeRepository,
    selections: &[Selection],
) -> Result<Vec<ShoppingItem>> {
    let mut builder = ShoppingListBuilder::new();
    let mut resolved = 0usize;

    for selection in selections {
        match repo.get(selection.recipe_id).await? {
            Some(recipe) => {
                builder.add_recipe(&recipe, selection.desired_servings());
                resolved += 1;
            }
            None => {
                debug!(
                    recipe_id = %selection.recipe_id,
                    "Skipping unknown recipe in shopping list selection"
                );
            }
        }
    }

    let items = builder.build();
    debug!(
        subsystem = "core",
        component = "shopping",
        op = "build_shopping_list",
        selection_count = selections.len(),
        resolved_count = resolved,
        result_count = items.len(),
        "Shopping list aggregated"
    );
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Ingredient};
    use chrono::Utc;

    fn recipe(
        title: &str,
        servings: i32,
        ingredients: &[(&str, Option<f64>, Option<&str>)],
    ) -> Recipe {
        let now = Utc::now();
        let id = Uuid::new_v4();
        Recipe {
            id,
            title: title.to_string(),
            description: None,
            category: Category::Dinner,
            servings,
            prep_time: None,
            cook_time: None,
            instructions: String::new(),
            calories: None,
            protein: None,
            carbs: None,
            fat: None,
            created_at: now,
            updated_at: now,
            ingredients: ingredients
                .iter()
                .map(|(name, amount, unit)| Ingredient {
                    id: Uuid::new_v4(),
                    recipe_id: id,
                    name: name.to_string(),
                    amount: *amount,
                    unit: unit.map(str::to_string),
                })
                .collect(),
        }
    }

    #[test]
    fn test_sugar_scenario() {
        let a = recipe("Cake", 2, &[("Sugar", Some(1.0), Some("cup"))]);
        let b = recipe("Cookies", 4, &[("sugar", Some(2.0), Some("cup"))]);

        let mut builder = ShoppingListBuilder::new();
        builder.add_recipe(&a, 4).add_recipe(&b, 4);
        let items = builder.build();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Sugar");
        assert_eq!(items[0].amount, 4.0);
        assert_eq!(items[0].unit, "cup");
        assert_eq!(items[0].recipes, vec!["Cake", "Cookies"]);
    }

    #[test]
    fn test_different_units_stay_separate() {
        let a = recipe(
            "Bread",
            1,
            &[("Flour", Some(2.0), Some("cup")), ("Flour", Some(250.0), Some("g"))],
        );

        let mut builder = ShoppingListBuilder::new();
        builder.add_recipe(&a, 1);
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_unit_comparison_is_case_sensitive() {
        let a = recipe("A", 1, &[("Milk", Some(1.0), Some("cup"))]);
        let b = recipe("B", 1, &[("milk", Some(1.0), Some("Cup"))]);

        let mut builder = ShoppingListBuilder::new();
        builder.add_recipe(&a, 1).add_recipe(&b, 1);
        assert_eq!(builder.build().len(), 2);
    }

    #[test]
    fn test_unit_whitespace_is_significant() {
        let a = recipe("A", 1, &[("Milk", Some(1.0), Some("cup"))]);
        let b = recipe("B", 1, &[("Milk", Some(1.0), Some("cup "))]);

        let mut builder = ShoppingListBuilder::new();
        builder.add_recipe(&a, 1).add_recipe(&b, 1);
        assert_eq!(builder.build().len(), 2);
    }

    #[test]
    fn test_missing_unit_and_empty_unit_merge() {
        let a = recipe("A", 1, &[("Eggs", Some(2.0), None)]);
        let b = recipe("B", 1, &[("eggs", Some(3.0), Some(""))]);

        let mut builder = ShoppingListBuilder::new();
        builder.add_recipe(&a, 1).add_recipe(&b, 1);
        let items = builder.build();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount, 5.0);
        assert_eq!(items[0].unit, "");
    }

    #[test]
    fn test_missing_amounts_count_as_zero() {
        let a = recipe("A", 2, &[("Salt", None, Some("tsp"))]);
        let b = recipe("B", 2, &[("salt", Some(1.0), Some("tsp"))]);

        let mut builder = ShoppingListBuilder::new();
        builder.add_recipe(&a, 4).add_recipe(&b, 4);
        let items = builder.build();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].amount, 2.0);
        assert_eq!(items[0].recipes, vec!["A", "B"]);
    }

    #[test]
    fn test_sorted_case_insensitively() {
        let a = recipe(
            "A",
            1,
            &[
                ("onion", Some(1.0), None),
                ("Garlic", Some(2.0), Some("clove")),
                ("apple", Some(3.0), None),
                ("Butter", Some(1.0), Some("tbsp")),
            ],
        );

        let mut builder = ShoppingListBuilder::new();
        builder.add_recipe(&a, 1);
        let names: Vec<String> = builder.build().into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["apple", "Butter", "Garlic", "onion"]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let a = recipe(
            "A",
            1,
            &[("Flour", Some(1.0), Some("g")), ("flour", Some(1.0), Some("cup"))],
        );

        let mut builder = ShoppingListBuilder::new();
        builder.add_recipe(&a, 1);
        let units: Vec<String> = builder.build().into_iter().map(|i| i.unit).collect();
        assert_eq!(units, vec!["g", "cup"]);
    }

    #[test]
    fn test_zero_servings_recipe_uses_multiplier_one() {
        let a = recipe("A", 0, &[("Rice", Some(2.0), Some("cup"))]);

        let mut builder = ShoppingListBuilder::new();
        builder.add_recipe(&a, 10);
        assert_eq!(builder.build()[0].amount, 2.0);
    }

    #[test]
    fn test_empty_recipe_contributes_nothing() {
        let a = recipe("Empty", 4, &[]);
        let mut builder = ShoppingListBuilder::new();
        builder.add_recipe(&a, 4);
        assert!(builder.is_empty());
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_selection_default_servings() {
        let json = format!(r#"{{"recipe_id": "{}"}}"#, Uuid::nil());
        let selection: Selection = serde_json::from_str(&json).unwrap();
        assert_eq!(selection.desired_servings(), DEFAULT_SELECTION_SERVINGS);
        assert_eq!(Selection::new(Uuid::nil(), 7).desired_servings(), 7);
    }
}
