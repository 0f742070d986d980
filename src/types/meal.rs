//! Meals as produced by the AI generator or normalised from meal plans.

use serde::{Deserialize, Serialize};

/// Calories and macronutrients (grams) for a meal or a day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroBreakdown {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
}

impl MacroBreakdown {
    /// Calories implied by the macros (4/4/9 kcal per gram).
    pub fn calories_from_macros(&self) -> f64 {
        self.protein * 4.0 + self.carbs * 4.0 + self.fat * 9.0
    }

    pub fn is_empty(&self) -> bool {
        self.calories == 0.0 && self.protein == 0.0 && self.carbs == 0.0 && self.fat == 0.0
    }
}

/// An ingredient line of a [`Meal`].
///
/// Deserialises from either a bare string (`"2 eggs"`) or an object with
/// `name`, `amount` and `unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "IngredientRepr")]
pub struct MealIngredient {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl MealIngredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: None,
            unit: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IngredientRepr {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        amount: Option<f64>,
        #[serde(default)]
        unit: Option<String>,
    },
}

impl From<IngredientRepr> for MealIngredient {
    fn from(repr: IngredientRepr) -> Self {
        match repr {
            IngredientRepr::Name(name) => MealIngredient::new(name),
            IngredientRepr::Full { name, amount, unit } => MealIngredient { name, amount, unit },
        }
    }
}

/// A single meal or recipe suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    /// breakfast, lunch, dinner, snack, ...
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<MealIngredient>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub nutrition: MacroBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_in_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    /// Recipe API id when the meal came from (or was matched to) an API recipe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_recipe_id: Option<u64>,
    /// Share of the ingredients already in the pantry, 0-100.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_percentage: Option<u8>,
}

impl Meal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meal_type: None,
            description: String::new(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
            nutrition: MacroBreakdown::default(),
            ready_in_minutes: None,
            servings: None,
            source_recipe_id: None,
            match_percentage: None,
        }
    }

    /// Name and ingredient names, the fields a dietary check looks at.
    pub(crate) fn dietary_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.ingredients.iter().map(|i| i.name.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ingredients_accept_strings_and_objects() {
        let meal: Meal = serde_json::from_value(serde_json::json!({
            "name": "Omelette",
            "ingredients": ["egg", {"name": "milk", "amount": 50, "unit": "ml"}]
        }))
        .unwrap();

        assert_eq!(meal.ingredients[0], MealIngredient::new("egg"));
        assert_eq!(meal.ingredients[1].amount, Some(50.0));
        assert_eq!(meal.ingredients[1].unit.as_deref(), Some("ml"));
        assert!(meal.nutrition.is_empty());
    }

    #[test]
    fn calories_from_macros() {
        let macros = MacroBreakdown {
            calories: 0.0,
            protein: 10.0,
            carbs: 20.0,
            fat: 5.0,
        };
        assert_eq!(macros.calories_from_macros(), 165.0);
    }
}
