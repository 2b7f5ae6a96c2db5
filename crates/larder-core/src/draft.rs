//! Recipe input as submitted by a client, and its validation into a form the
//! repositories can persist.
//!
//! Ingredients arrive as a list of `{name, amount, unit}` rows. Rows whose name
//! is blank after trimming are dropped; every other row must carry a parseable,
//! non-negative amount (or none at all).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Category, DEFAULT_SERVINGS};

/// Amount as submitted: a JSON number or the raw text of a form field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

/// One submitted ingredient row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct IngredientInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[schema(value_type = Option<f64>)]
    pub amount: Option<AmountInput>,
    #[serde(default)]
    pub unit: Option<String>,
}

impl IngredientInput {
    pub fn new(name: impl Into<String>, amount: Option<f64>, unit: Option<&str>) -> Self {
        Self {
            name: name.into(),
            amount: amount.map(AmountInput::Number),
            unit: unit.map(str::to_string),
        }
    }

    /// Build a row from three raw text fields, as a form would post them.
    pub fn from_text(name: &str, amount: &str, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            amount: Some(AmountInput::Text(amount.to_string())),
            unit: Some(unit.to_string()),
        }
    }

    /// Validate this row. `Ok(None)` means the row is blank and should be skipped.
    fn validate(self) -> Result<Option<NewIngredient>> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Ok(None);
        }

        let amount = match self.amount {
            None => None,
            Some(AmountInput::Number(n)) => Some(n),
            Some(AmountInput::Text(text)) => {
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(text.parse::<f64>().map_err(|_| {
                        Error::InvalidInput(format!(
                            "Amount '{}' for ingredient '{}' is not a number",
                            text, name
                        ))
                    })?)
                }
            }
        };

        if let Some(a) = amount {
            if !a.is_finite() || a < 0.0 {
                return Err(Error::InvalidInput(format!(
                    "Amount for ingredient '{}' must be a non-negative number",
                    name
                )));
            }
        }

        // Stored as typed; the shopping list matches units exactly.
        let unit = self.unit.filter(|u| !u.trim().is_empty());

        Ok(Some(NewIngredient { name, amount, unit }))
    }
}

/// Recipe as submitted for create or full replace.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct RecipeDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Category name; blank or absent means Dinner.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub servings: Option<i32>,
    #[serde(default)]
    pub prep_time: Option<i32>,
    #[serde(default)]
    pub cook_time: Option<i32>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub calories: Option<i32>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbs: Option<f64>,
    #[serde(default)]
    pub fat: Option<f64>,
    #[serde(default)]
    pub ingredients: Vec<IngredientInput>,
}

impl RecipeDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_servings(mut self, servings: i32) -> Self {
        self.servings = Some(servings);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_ingredient(mut self, name: &str, amount: Option<f64>, unit: Option<&str>) -> Self {
        self.ingredients.push(IngredientInput::new(name, amount, unit));
        self
    }

    /// Check required fields and materialize the ingredient rows.
    pub fn validate(self) -> Result<NewRecipe> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::InvalidInput("Title is required".to_string()));
        }

        let category = match self.category.as_deref().map(str::trim) {
            None | Some("") => Category::default(),
            Some(name) => name.parse::<Category>().map_err(Error::InvalidInput)?,
        };

        let servings = self.servings.unwrap_or(DEFAULT_SERVINGS);
        if servings < 1 {
            return Err(Error::InvalidInput(
                "Servings must be a positive number".to_string(),
            ));
        }

        for (field, value) in [("prep_time", self.prep_time), ("cook_time", self.cook_time)] {
            if matches!(value, Some(v) if v < 0) {
                return Err(Error::InvalidInput(format!("{} must not be negative", field)));
            }
        }

        let mut ingredients = Vec::with_capacity(self.ingredients.len());
        for row in self.ingredients {
            if let Some(ingredient) = row.validate()? {
                ingredients.push(ingredient);
            }
        }

        Ok(NewRecipe {
            title,
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            category,
            servings,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            instructions: self.instructions.unwrap_or_default(),
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
            ingredients,
        })
    }
}

/// A validated ingredient ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewIngredient {
    pub name: String,
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

/// A validated recipe ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    pub servings: i32,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub instructions: String,
    pub calories: Option<i32>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub ingredients: Vec<NewIngredient>,
}
