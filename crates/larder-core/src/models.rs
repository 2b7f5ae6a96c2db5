//! Recipe catalog entities and the enumerated constants shared with clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Servings assumed when a recipe is created without an explicit count.
pub const DEFAULT_SERVINGS: i32 = 4;

/// Suggested units offered to clients. Not enforced: stored data may carry
/// any free-text unit.
pub const SUGGESTED_UNITS: &[&str] = &[
    "", "cup", "tbsp", "tsp", "oz", "lb", "g", "kg", "ml", "L", "piece", "slice", "clove", "can",
    "bunch",
];

// =============================================================================
// CATEGORY
// =============================================================================

/// Fixed set of recipe categories.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum Category {
    Breakfast,
    Lunch,
    #[default]
    Dinner,
    Dessert,
    Snack,
    Drink,
    Side,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 7] = [
        Category::Breakfast,
        Category::Lunch,
        Category::Dinner,
        Category::Dessert,
        Category::Snack,
        Category::Drink,
        Category::Side,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "Breakfast",
            Self::Lunch => "Lunch",
            Self::Dinner => "Dinner",
            Self::Dessert => "Dessert",
            Self::Snack => "Snack",
            Self::Drink => "Drink",
            Self::Side => "Side",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "dessert" => Ok(Self::Dessert),
            "snack" => Ok(Self::Snack),
            "drink" => Ok(Self::Drink),
            "side" => Ok(Self::Side),
            _ => Err(format!("Invalid category: {}", s)),
        }
    }
}

// =============================================================================
// RECIPE / INGREDIENT
// =============================================================================

/// A single ingredient line owned by a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Ingredient {
    pub id: Uuid,
    /// Owning recipe. Not part of the serialized form.
    #[serde(skip)]
    pub recipe_id: Uuid,
    pub name: String,
    /// Quantity; `None` means "to taste".
    pub amount: Option<f64>,
    pub unit: Option<String>,
}

/// A recipe with its ordered ingredients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Recipe {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Category,
    /// Base serving count, the scaling baseline.
    pub servings: i32,
    /// Minutes
    pub prep_time: Option<i32>,
    /// Minutes
    pub cook_time: Option<i32>,
    pub instructions: String,

    // Per-serving nutrition, stored as entered
    pub calories: Option<i32>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// Prep plus cook time in minutes, treating missing values as zero.
    ///
    /// Widened to `i64`: each time may be up to `i32::MAX`.
    pub fn total_time(&self) -> i64 {
        i64::from(self.prep_time.unwrap_or(0)) + i64::from(self.cook_time.unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe() -> Recipe {
        let now = Utc::now();
        let id = Uuid::new_v4();
        Recipe {
            id,
            title: "Pancakes".to_string(),
            description: None,
            category: Category::Breakfast,
            servings: 2,
            prep_time: Some(10),
            cook_time: None,
            instructions: String::new(),
            calories: None,
            protein: None,
            carbs: None,
            fat: None,
            created_at: now,
            updated_at: now,
            ingredients: vec![Ingredient {
                id: Uuid::new_v4(),
                recipe_id: id,
                name: "Flour".to_string(),
                amount: Some(1.5),
                unit: Some("cup".to_string()),
            }],
        }
    }

    #[test]
    fn test_category_default_is_dinner() {
        assert_eq!(Category::default(), Category::Dinner);
    }

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!("dessert".parse::<Category>().unwrap(), Category::Dessert);
        assert_eq!(" Snack ".parse::<Category>().unwrap(), Category::Snack);
        assert!("Brunch".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_display_matches_parse() {
        for category in Category::ALL {
            assert_eq!(category.to_string().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_category_serializes_as_name() {
        let json = serde_json::to_string(&Category::Side).unwrap();
        assert_eq!(json, "\"Side\"");
    }

    #[test]
    fn test_suggested_units_include_blank() {
        assert_eq!(SUGGESTED_UNITS.len(), 15);
        assert_eq!(SUGGESTED_UNITS[0], "");
        assert!(SUGGESTED_UNITS.contains(&"clove"));
    }

    #[test]
    fn test_total_time_treats_missing_as_zero() {
        let mut r = recipe();
        assert_eq!(r.total_time(), 10);
        r.cook_time = Some(25);
        assert_eq!(r.total_time(), 35);
        r.prep_time = None;
        r.cook_time = None;
        assert_eq!(r.total_time(), 0);
    }

    #[test]
    fn test_total_time_does_not_overflow() {
        let mut r = recipe();
        r.prep_time = Some(i32::MAX);
        r.cook_time = Some(i32::MAX);
        assert_eq!(r.total_time(), 2 * i64::from(i32::MAX));
    }

    #[test]
    fn test_ingredient_serialization_omits_recipe_id() {
        let r = recipe();
        let value = serde_json::to_value(&r.ingredients[0]).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(obj.contains_key("id"));
        assert!(obj.contains_key("name"));
        assert!(obj.contains_key("amount"));
        assert!(obj.contains_key("unit"));
    }

    #[test]
    fn test_recipe_serialization_embeds_ingredients() {
        let r = recipe();
        let value = serde_json::to_value(&r).unwrap();
        assert_eq!(value["title"], "Pancakes");
        assert_eq!(value["category"], "Breakfast");
        assert_eq!(value["ingredients"][0]["name"], "Flour");
        assert_eq!(value["ingredients"][0]["amount"], 1.5);
        assert!(value["calories"].is_null());
    }
}
