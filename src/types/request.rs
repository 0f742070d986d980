//! Orchestrator requests and results.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::meal::{MacroBreakdown, Meal};
use super::pantry::{PantryItem, UserProfile, normalized_list};
use super::recipe::RecipeMatch;
use crate::cache::generate_key;
use crate::config::ApiSource;

/// Find-by-ingredients ranking strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ranking {
    /// Prefer recipes that use as many pantry ingredients as possible.
    #[default]
    MaximizeUsed,
    /// Prefer recipes that need as few extra ingredients as possible.
    MinimizeMissing,
}

impl Ranking {
    /// Numeric form used on the wire.
    pub fn as_param(&self) -> u8 {
        match self {
            Ranking::MaximizeUsed => 1,
            Ranking::MinimizeMissing => 2,
        }
    }
}

/// "Find recipes for this pantry."
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindRecipesRequest {
    pub ingredients: Vec<String>,
    pub number: u32,
    pub ranking: Ranking,
    /// Ignore staples (water, salt, flour, ...) when matching.
    pub ignore_pantry: bool,
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl FindRecipesRequest {
    pub fn new<I, S>(ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ingredients: ingredients.into_iter().map(Into::into).collect(),
            number: 10,
            ranking: Ranking::default(),
            ignore_pantry: true,
            profile: None,
        }
    }

    /// Request built from the in-stock items of a pantry.
    pub fn from_pantry(pantry: &[PantryItem]) -> Self {
        Self::new(
            pantry
                .iter()
                .filter(|item| item.in_stock())
                .map(|item| item.name.clone()),
        )
    }

    pub fn number(mut self, number: u32) -> Self {
        self.number = number;
        self
    }

    pub fn ranking(mut self, ranking: Ranking) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn ignore_pantry(mut self, value: bool) -> Self {
        self.ignore_pantry = value;
        self
    }

    pub fn profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Ingredients trimmed, lowercased, de-duplicated and sorted.
    pub fn normalized_ingredients(&self) -> Vec<String> {
        normalized_list(&self.ingredients)
    }

    /// Cache key for this request; equal for requests that differ only in
    /// ingredient order, case or duplicates.
    pub fn cache_key(&self) -> String {
        generate_key("find_recipes", self.cache_params())
    }

    /// Parameters identifying this request in the cache.
    fn cache_params(&self) -> Vec<(&'static str, Value)> {
        let mut params = vec![
            ("ingredients", json!(self.normalized_ingredients())),
            ("number", json!(self.number)),
            ("ranking", json!(self.ranking.as_param())),
            ("ignorePantry", json!(self.ignore_pantry)),
        ];
        if let Some(profile) = &self.profile {
            params.push(("allergies", json!(profile.normalized_allergies())));
            params.push(("diet", json!(profile.normalized_restrictions())));
        }
        params
    }
}

/// Meal plan span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFrame {
    #[default]
    Day,
    Week,
}

impl TimeFrame {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeFrame::Day => "day",
            TimeFrame::Week => "week",
        }
    }

    pub fn days(&self) -> usize {
        match self {
            TimeFrame::Day => 1,
            TimeFrame::Week => 7,
        }
    }
}

/// "Generate a meal plan."
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanRequest {
    #[serde(default)]
    pub time_frame: TimeFrame,
    #[serde(default)]
    pub target_calories: Option<u32>,
    #[serde(default)]
    pub diet: Option<String>,
    /// Ingredients to leave out.
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub profile: Option<UserProfile>,
    /// Pantry ingredient names the AI generator should favour.
    #[serde(default)]
    pub pantry: Vec<String>,
}

impl MealPlanRequest {
    pub fn new(time_frame: TimeFrame) -> Self {
        Self {
            time_frame,
            ..Default::default()
        }
    }

    pub fn target_calories(mut self, calories: u32) -> Self {
        self.target_calories = Some(calories);
        self
    }

    pub fn diet(mut self, diet: impl Into<String>) -> Self {
        self.diet = Some(diet.into());
        self
    }

    pub fn exclude(mut self, ingredient: impl Into<String>) -> Self {
        self.exclude.push(ingredient.into());
        self
    }

    pub fn profile(mut self, profile: UserProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn pantry(mut self, items: &[PantryItem]) -> Self {
        self.pantry = items
            .iter()
            .filter(|item| item.in_stock())
            .map(|item| item.name.clone())
            .collect();
        self
    }

    /// Explicit target, else the profile's computed target.
    pub fn effective_target_calories(&self) -> Option<u32> {
        self.target_calories.or_else(|| {
            self.profile
                .as_ref()
                .and_then(UserProfile::macro_targets)
                .map(|t| t.calories)
        })
    }

    /// Explicit diet, else the profile's first dietary restriction.
    pub fn effective_diet(&self) -> Option<String> {
        self.diet
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_lowercase)
            .or_else(|| {
                self.profile
                    .as_ref()
                    .and_then(|p| p.normalized_restrictions().into_iter().next())
            })
    }

    /// Explicit exclusions plus profile allergies, normalised.
    pub fn effective_exclude(&self) -> Vec<String> {
        let mut all = self.exclude.clone();
        if let Some(profile) = &self.profile {
            all.extend(profile.allergies.iter().cloned());
        }
        normalized_list(&all)
    }

    /// Cache key for this request.
    pub fn cache_key(&self) -> String {
        generate_key("meal_plan", self.cache_params())
    }

    fn cache_params(&self) -> Vec<(&'static str, Value)> {
        vec![
            ("timeFrame", json!(self.time_frame.as_str())),
            ("targetCalories", json!(self.effective_target_calories())),
            ("diet", json!(self.effective_diet())),
            ("exclude", json!(self.effective_exclude())),
            ("pantry", json!(normalized_list(&self.pantry))),
        ]
    }
}

/// Where a result came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Origin {
    Api { source: ApiSource },
    Ai { provider: String },
}

/// Answer to a [`FindRecipesRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum RecipeSuggestions {
    /// Matches from a recipe API.
    Api {
        source: ApiSource,
        recipes: Vec<RecipeMatch>,
    },
    /// Meals produced by the AI generator.
    Ai { provider: String, meals: Vec<Meal> },
}

impl RecipeSuggestions {
    pub fn origin(&self) -> Origin {
        match self {
            RecipeSuggestions::Api { source, .. } => Origin::Api { source: *source },
            RecipeSuggestions::Ai { provider, .. } => Origin::Ai {
                provider: provider.clone(),
            },
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecipeSuggestions::Api { recipes, .. } => recipes.len(),
            RecipeSuggestions::Ai { meals, .. } => meals.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One day of a [`MealPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedDay {
    /// "day" for single-day plans, weekday names for weekly plans.
    pub label: String,
    pub meals: Vec<Meal>,
    #[serde(default)]
    pub totals: Option<MacroBreakdown>,
}

impl PlannedDay {
    /// Stated totals, or the sum of the meals' nutrition.
    pub fn effective_totals(&self) -> MacroBreakdown {
        self.totals.unwrap_or_else(|| {
            self.meals
                .iter()
                .fold(MacroBreakdown::default(), |acc, meal| MacroBreakdown {
                    calories: acc.calories + meal.nutrition.calories,
                    protein: acc.protein + meal.nutrition.protein,
                    carbs: acc.carbs + meal.nutrition.carbs,
                    fat: acc.fat + meal.nutrition.fat,
                })
        })
    }
}

/// Answer to a [`MealPlanRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlan {
    pub origin: Origin,
    pub days: Vec<PlannedDay>,
}

impl MealPlan {
    pub fn meal_count(&self) -> usize {
        self.days.iter().map(|d| d.meals.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.meal_count() == 0
    }

    pub fn meals(&self) -> impl Iterator<Item = &Meal> {
        self.days.iter().flat_map(|d| d.meals.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pantry_skips_out_of_stock() {
        let pantry = vec![
            PantryItem::new("Eggs"),
            PantryItem::new("milk").quantity(0.0, "ml"),
            PantryItem::new("spinach").quantity(200.0, "g"),
        ];
        let request = FindRecipesRequest::from_pantry(&pantry);
        assert_eq!(request.ingredients, vec!["Eggs", "spinach"]);
    }

    #[test]
    fn normalized_ingredients_sorted_and_deduped() {
        let request = FindRecipesRequest::new([" Tomato", "basil", "tomato", ""]);
        assert_eq!(request.normalized_ingredients(), vec!["basil", "tomato"]);
    }

    #[test]
    fn cache_key_ignores_ingredient_order_and_case() {
        let a = FindRecipesRequest::new(["Eggs", "rice"]);
        let b = FindRecipesRequest::new(["rice", "eggs", "RICE"]);
        assert_eq!(a.cache_key(), b.cache_key());
        assert!(a.cache_key().starts_with("find_recipes:"));
        assert_ne!(a.cache_key(), a.clone().number(5).cache_key());
    }

    #[test]
    fn meal_plan_uses_profile_defaults() {
        let profile = UserProfile {
            dietary_restrictions: vec!["Vegetarian".into()],
            allergies: vec!["Peanut".into()],
            calorie_target: Some(1800),
            ..Default::default()
        };
        let request = MealPlanRequest::new(TimeFrame::Day)
            .exclude("olives")
            .profile(profile);

        assert_eq!(request.effective_target_calories(), Some(1800));
        assert_eq!(request.effective_diet().as_deref(), Some("vegetarian"));
        assert_eq!(request.effective_exclude(), vec!["olives", "peanut"]);
    }

    #[test]
    fn explicit_diet_wins() {
        let request = MealPlanRequest::new(TimeFrame::Week)
            .diet("Vegan")
            .profile(UserProfile {
                dietary_restrictions: vec!["keto".into()],
                ..Default::default()
            });
        assert_eq!(request.effective_diet().as_deref(), Some("vegan"));
    }

    #[test]
    fn planned_day_sums_meals_without_totals() {
        let mut breakfast = Meal::new("oats");
        breakfast.nutrition.calories = 300.0;
        let mut lunch = Meal::new("salad");
        lunch.nutrition.calories = 450.0;
        let day = PlannedDay {
            label: "day".into(),
            meals: vec![breakfast, lunch],
            totals: None,
        };
        assert_eq!(day.effective_totals().calories, 750.0);
    }

    #[test]
    fn suggestions_serialise_with_origin_tag() {
        let suggestions = RecipeSuggestions::Ai {
            provider: "openai".into(),
            meals: vec![Meal::new("Frittata")],
        };
        let json = serde_json::to_value(&suggestions).unwrap();
        assert_eq!(json["origin"], "ai");
        assert_eq!(json["meals"][0]["name"], "Frittata");
    }
}
