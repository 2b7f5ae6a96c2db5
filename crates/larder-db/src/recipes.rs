//! Recipe repository implementation.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::debug;
use uuid::Uuid;

use larder_core::{
    Category, Error, Ingredient, NewIngredient, NewRecipe, Recipe, RecipeDraft, RecipeFilter,
    RecipeRepository, Result,
};

use crate::escape_like;

const RECIPE_COLUMNS: &str = "r.id, r.title, r.description, r.category, r.servings, \
     r.prep_time, r.cook_time, r.instructions, r.calories, r.protein, r.carbs, r.fat, \
     r.created_at, r.updated_at";

/// PostgreSQL implementation of RecipeRepository.
#[derive(Clone)]
pub struct PgRecipeRepository {
    pool: Pool<Postgres>,
}

impl PgRecipeRepository {
    /// Create a new PgRecipeRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a read-only transaction that sees one snapshot across statements,
    /// so a recipe and its ingredient rows are read from the same state.
    async fn begin_snapshot(&self) -> Result<Transaction<'_, Postgres>> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        Ok(tx)
    }

    /// Insert a recipe row and its ingredient rows within an existing transaction.
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        new: NewRecipe,
    ) -> Result<Recipe> {
        let id = Uuid::now_v7();
        // Postgres keeps microseconds; truncate so the returned value round-trips.
        let now = Utc::now().trunc_subsecs(6);

        sqlx::query(
            "INSERT INTO recipe (id, title, description, category, servings, prep_time,
                                 cook_time, instructions, calories, protein, carbs, fat,
                                 created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)",
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.category.as_str())
        .bind(new.servings)
        .bind(new.prep_time)
        .bind(new.cook_time)
        .bind(&new.instructions)
        .bind(new.calories)
        .bind(new.protein)
        .bind(new.carbs)
        .bind(new.fat)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        let ingredients = Self::insert_ingredients_tx(tx, id, &new.ingredients).await?;
        Ok(materialize(id, new, now, ingredients))
    }

    /// Overwrite a recipe's fields and replace its ingredient list within a transaction.
    pub async fn update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        new: &NewRecipe,
    ) -> Result<()> {
        let now = Utc::now().trunc_subsecs(6);

        let result = sqlx::query(
            "UPDATE recipe
             SET title = $2, description = $3, category = $4, servings = $5, prep_time = $6,
                 cook_time = $7, instructions = $8, calories = $9, protein = $10, carbs = $11,
                 fat = $12, updated_at = $13
             WHERE id = $1",
        )
        .bind(id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.category.as_str())
        .bind(new.servings)
        .bind(new.prep_time)
        .bind(new.cook_time)
        .bind(&new.instructions)
        .bind(new.calories)
        .bind(new.protein)
        .bind(new.carbs)
        .bind(new.fat)
        .bind(now)
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::RecipeNotFound(id));
        }

        sqlx::query("DELETE FROM ingredient WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        Self::insert_ingredients_tx(tx, id, &new.ingredients).await?;
        Ok(())
    }

    /// Remove a recipe and every ingredient row it owns within a transaction.
    pub async fn delete_tx(&self, tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<()> {
        let removed = sqlx::query("DELETE FROM ingredient WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?
            .rows_affected();

        let result = sqlx::query("DELETE FROM recipe WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::RecipeNotFound(id));
        }

        debug!(recipe_id = %id, ingredients_removed = removed, "Recipe rows deleted");
        Ok(())
    }

    async fn insert_ingredients_tx(
        tx: &mut Transaction<'_, Postgres>,
        recipe_id: Uuid,
        ingredients: &[NewIngredient],
    ) -> Result<Vec<Ingredient>> {
        let mut stored = Vec::with_capacity(ingredients.len());
        for (position, ingredient) in ingredients.iter().enumerate() {
            let id = Uuid::now_v7();
            sqlx::query(
                "INSERT INTO ingredient (id, recipe_id, position, name, amount, unit)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(id)
            .bind(recipe_id)
            .bind(position as i32)
            .bind(&ingredient.name)
            .bind(ingredient.amount)
            .bind(&ingredient.unit)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;

            stored.push(Ingredient {
                id,
                recipe_id,
                name: ingredient.name.clone(),
                amount: ingredient.amount,
                unit: ingredient.unit.clone(),
            });
        }
        Ok(stored)
    }

    /// Load ingredient rows for all `recipes` in one query and attach them in
    /// stored order.
    async fn attach_ingredients(
        tx: &mut Transaction<'_, Postgres>,
        recipes: &mut [Recipe],
    ) -> Result<()> {
        if recipes.is_empty() {
            return Ok(());
        }

        let ids: Vec<Uuid> = recipes.iter().map(|r| r.id).collect();
        let rows = sqlx::query(
            "SELECT id, recipe_id, name, amount, unit
             FROM ingredient
             WHERE recipe_id = ANY($1)
             ORDER BY recipe_id, position",
        )
        .bind(&ids[..])
        .fetch_all(&mut **tx)
        .await
        .map_err(Error::Database)?;

        let mut by_recipe: HashMap<Uuid, Vec<Ingredient>> = HashMap::new();
        for row in &rows {
            let ingredient = map_row_to_ingredient(row);
            by_recipe
                .entry(ingredient.recipe_id)
                .or_default()
                .push(ingredient);
        }

        for recipe in recipes.iter_mut() {
            recipe.ingredients = by_recipe.remove(&recipe.id).unwrap_or_default();
        }
        Ok(())
    }
}

fn materialize(
    id: Uuid,
    new: NewRecipe,
    now: DateTime<Utc>,
    ingredients: Vec<Ingredient>,
) -> Recipe {
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
        created_at: now,
        updated_at: now,
        ingredients,
    }
}

fn map_row_to_recipe(row: &PgRow) -> Result<Recipe> {
    let category: String = row.get("category");
    let category: Category = category
        .parse()
        .map_err(|e: String| Error::Internal(format!("stored recipe has {}", e)))?;

    Ok(Recipe {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        category,
        servings: row.get("servings"),
        prep_time: row.get("prep_time"),
        cook_time: row.get("cook_time"),
        instructions: row.get("instructions"),
        calories: row.get("calories"),
        protein: row.get("protein"),
        carbs: row.get("carbs"),
        fat: row.get("fat"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        ingredients: Vec::new(),
    })
}

fn map_row_to_ingredient(row: &PgRow) -> Ingredient {
    Ingredient {
        id: row.get("id"),
        recipe_id: row.get("recipe_id"),
        name: row.get("name"),
        amount: row.get("amount"),
        unit: row.get("unit"),
    }
}

#[async_trait]
impl RecipeRepository for PgRecipeRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Recipe>> {
        let mut tx = self.begin_snapshot().await?;

        let row = sqlx::query(&format!("SELECT {} FROM recipe r WHERE r.id = $1", RECIPE_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let Some(row) = row else {
            tx.commit().await.map_err(Error::Database)?;
            return Ok(None);
        };

        let mut recipes = vec![map_row_to_recipe(&row)?];
        Self::attach_ingredients(&mut tx, &mut recipes).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(recipes.pop())
    }

    async fn list_all(&self) -> Result<Vec<Recipe>> {
        let mut tx = self.begin_snapshot().await?;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM recipe r ORDER BY r.created_at ASC, r.id ASC",
            RECIPE_COLUMNS
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let mut recipes = rows
            .iter()
            .map(map_row_to_recipe)
            .collect::<Result<Vec<_>>>()?;
        Self::attach_ingredients(&mut tx, &mut recipes).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(recipes)
    }

    async fn list_filtered(&self, filter: RecipeFilter) -> Result<Vec<Recipe>> {
        let start = Instant::now();
        let pattern = filter
            .search_text()
            .map(|text| format!("%{}%", escape_like(text)));
        let category = filter.category.map(|c| c.as_str());

        let mut tx = self.begin_snapshot().await?;

        let rows = sqlx::query(&format!(
            r#"SELECT {}
               FROM recipe r
               WHERE ($1::text IS NULL
                      OR r.title ILIKE $1 ESCAPE '\'
                      OR r.description ILIKE $1 ESCAPE '\'
                      OR EXISTS (SELECT 1 FROM ingredient i
                                 WHERE i.recipe_id = r.id AND i.name ILIKE $1 ESCAPE '\'))
                 AND ($2::text IS NULL OR r.category = $2)
               ORDER BY r.updated_at DESC, r.id DESC"#,
            RECIPE_COLUMNS
        ))
        .bind(pattern.as_deref())
        .bind(category)
        .fetch_all(&mut *tx)
        .await
        .map_err(Error::Database)?;

        let mut recipes = rows
            .iter()
            .map(map_row_to_recipe)
            .collect::<Result<Vec<_>>>()?;
        Self::attach_ingredients(&mut tx, &mut recipes).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "recipes",
            op = "list_filtered",
            has_search = pattern.is_some(),
            category = category.unwrap_or(""),
            result_count = recipes.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Recipes filtered"
        );
        Ok(recipes)
    }

    async fn create(&self, draft: RecipeDraft) -> Result<Recipe> {
        let new = draft.validate()?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let recipe = self.insert_tx(&mut tx, new).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(
            recipe_id = %recipe.id,
            ingredient_count = recipe.ingredients.len(),
            "Recipe created"
        );
        Ok(recipe)
    }

    async fn update(&self, id: Uuid, draft: RecipeDraft) -> Result<()> {
        let new = draft.validate()?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.update_tx(&mut tx, id, &new).await?;
        tx.commit().await.map_err(Error::Database)?;

        debug!(recipe_id = %id, ingredient_count = new.ingredients.len(), "Recipe updated");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        self.delete_tx(&mut tx, id).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }
}
