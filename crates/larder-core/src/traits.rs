//! Repository abstraction over recipe storage.
//!
//! Storage engines implement [`RecipeRepository`]; scaling and shopping-list
//! aggregation only ever talk to this trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::draft::RecipeDraft;
use crate::error::Result;
use crate::models::{Category, Recipe};

/// Search and category filter for listing recipes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    /// Case-insensitive substring matched against title, description and
    /// ingredient names.
    pub search: Option<String>,
    /// Exact category match.
    pub category: Option<Category>,
}

impl RecipeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Trimmed search text, or `None` when blank.
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Whether `recipe` passes this filter.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        if let Some(category) = self.category {
            if recipe.category != category {
                return false;
            }
        }

        let Some(needle) = self.search_text().map(str::to_lowercase) else {
            return true;
        };

        recipe.title.to_lowercase().contains(&needle)
            || recipe
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
            || recipe
                .ingredients
                .iter()
                .any(|i| i.name.to_lowercase().contains(&needle))
    }
}

/// Repository for recipe CRUD and filtered listing.
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Fetch a recipe with its ingredients, or `None` if the id is unknown.
    async fn get(&self, id: Uuid) -> Result<Option<Recipe>>;

    /// List every recipe in creation order.
    async fn list_all(&self) -> Result<Vec<Recipe>>;

    /// List recipes passing `filter`, most recently updated first.
    async fn list_filtered(&self, filter: RecipeFilter) -> Result<Vec<Recipe>>;

    /// Validate and persist a new recipe with its ingredients.
    async fn create(&self, draft: RecipeDraft) -> Result<Recipe>;

    /// Replace a recipe's fields and its whole ingredient set.
    async fn update(&self, id: Uuid, draft: RecipeDraft) -> Result<()>;

    /// Delete a recipe and all of its ingredients.
    async fn delete(&self, id: Uuid) -> Result<()>;
}
