//! In-process recipe repository.
//!
//! Backs the `memory` storage backend and the test suites. Every mutation
//! happens under one write lock, so readers see a recipe either before or after
//! a change, never half of it.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::draft::{NewRecipe, RecipeDraft};
use crate::error::{Error, Result};
use crate::models::{Ingredient, Recipe};
use crate::traits::{RecipeFilter, RecipeRepository};

#[derive(Debug)]
struct StoredRecipe {
    recipe: Recipe,
    /// Creation sequence, for `list_all` ordering.
    created_seq: u64,
    /// Last-mutation sequence, breaks `updated_at` ties.
    updated_seq: u64,
}

#[derive(Debug, Default)]
struct Store {
    recipes: HashMap<Uuid, StoredRecipe>,
    seq: u64,
}

impl Store {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

/// Recipe repository held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryRecipeRepository {
    store: RwLock<Store>,
}

impl InMemoryRecipeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total ingredient rows across all recipes.
    pub fn ingredient_count(&self) -> Result<usize> {
        let store = self.read()?;
        Ok(store
            .recipes
            .values()
            .map(|s| s.recipe.ingredients.len())
            .sum())
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|_| Error::Internal("recipe store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Store>> {
        self.store
            .write()
            .map_err(|_| Error::Internal("recipe store lock poisoned".to_string()))
    }

    fn materialize(
        id: Uuid,
        new: NewRecipe,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Recipe {
        let ingredients = new
            .ingredients
            .into_iter()
            .map(|i| Ingredient {
                id: Uuid::now_v7(),
                recipe_id: id,
                name: i.name,
                amount: i.amount,
                unit: i.unit,
            })
            .collect();

        Recipe {
            id,
            title: new.title,
            description: new.description,
            category: new.category,
            servings: new.servings,
            prep_time: new.prep_time,
            cook_time: new.cook_time,
            instructions: new.instructions,
            calories: new.calories,
            protein: new.protein,
            carbs: new.carbs,
            fat: new.fat,
            created_at,
            updated_at,
            ingredients,
        }
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Recipe>> {
        let store = self.read()?;
        Ok(store.recipes.get(&id).map(|s| s.recipe.clone()))
    }

    async fn list_all(&self) -> Result<Vec<Recipe>> {
        let store = self.read()?;
        let mut stored: Vec<&StoredRecipe> = store.recipes.values().collect();
        stored.sort_by_key(|s| s.created_seq);
        Ok(stored.into_iter().map(|s| s.recipe.clone()).collect())
    }

    async fn list_filtered(&self, filter: RecipeFilter) -> Result<Vec<Recipe>> {
        let store = self.read()?;
        let mut stored: Vec<&StoredRecipe> = store
            .recipes
            .values()
            .filter(|s| filter.matches(&s.recipe))
            .collect();
        stored.sort_by(|a, b| {
            b.recipe
                .updated_at
                .cmp(&a.recipe.updated_at)
                .then(b.updated_seq.cmp(&a.updated_seq))
        });
        Ok(stored.into_iter().map(|s| s.recipe.clone()).collect())
    }

    async fn create(&self, draft: RecipeDraft) -> Result<Recipe> {
        let new = draft.validate()?;
        let id = Uuid::now_v7();
        let now = Utc::now();
        let recipe = Self::materialize(id, new, now, now);

        let mut store = self.write()?;
        let seq = store.next_seq();
        store.recipes.insert(
            id,
            StoredRecipe {
                recipe: recipe.clone(),
                created_seq: seq,
                updated_seq: seq,
            },
        );

        debug!(recipe_id = %id, ingredient_count = recipe.ingredients.len(), "Recipe created");
        Ok(recipe)
    }

    async fn update(&self, id: Uuid, draft: RecipeDraft) -> Result<()> {
        let new = draft.validate()?;

        let mut store = self.write()?;
        let seq = store.next_seq();
        let stored = store
            .recipes
            .get_mut(&id)
            .ok_or(Error::RecipeNotFound(id))?;

        stored.recipe = Self::materialize(id, new, stored.recipe.created_at, Utc::now());
        stored.updated_seq = seq;

        debug!(recipe_id = %id, "Recipe updated");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut store = self.write()?;
        store
            .recipes
            .remove(&id)
            .ok_or(Error::RecipeNotFound(id))?;

        debug!(recipe_id = %id, "Recipe deleted");
        Ok(())
    }
}
