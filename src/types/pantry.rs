//! Pantry inventory and user profile records.

use serde::{Deserialize, Serialize};

/// One item of the user's on-hand inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PantryItem {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl PantryItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: None,
            unit: None,
            category: None,
        }
    }

    pub fn quantity(mut self, quantity: f64, unit: impl Into<String>) -> Self {
        self.quantity = Some(quantity);
        self.unit = Some(unit.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Whether the item is usable in a recipe (absent quantity counts as in stock).
    pub fn in_stock(&self) -> bool {
        self.quantity.is_none_or(|q| q > 0.0)
    }
}

/// Normalise an ingredient name for comparison: trimmed, lowercase.
pub(crate) fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Whether `ingredient` is covered by any pantry name.
///
/// Matching is by normalised substring in either direction, so "chicken
/// breast" is covered by "chicken" and "eggs" by "egg".
pub(crate) fn pantry_covers(pantry: &[String], ingredient: &str) -> bool {
    let ingredient = normalize_name(ingredient);
    if ingredient.is_empty() {
        return false;
    }
    pantry
        .iter()
        .any(|p| !p.is_empty() && (ingredient.contains(p.as_str()) || p.contains(&ingredient)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    #[default]
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Multiplier applied to basal metabolic rate.
    pub fn factor(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl Goal {
    fn calorie_adjustment(&self) -> f64 {
        match self {
            Goal::Lose => -500.0,
            Goal::Maintain => 0.0,
            Goal::Gain => 300.0,
        }
    }
}

/// Daily calorie and macronutrient targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacroTargets {
    pub calories: u32,
    pub protein_g: u32,
    pub carbs_g: u32,
    pub fat_g: u32,
}

impl MacroTargets {
    /// Split a calorie budget 30/40/30 across protein, carbs and fat.
    pub fn from_calories(calories: u32) -> Self {
        let kcal = f64::from(calories);
        Self {
            calories,
            protein_g: (kcal * 0.30 / 4.0).round() as u32,
            carbs_g: (kcal * 0.40 / 4.0).round() as u32,
            fat_g: (kcal * 0.30 / 9.0).round() as u32,
        }
    }
}

/// Lowest daily calorie target ever suggested.
const MIN_DAILY_CALORIES: f64 = 1200.0;

/// Dietary preferences and body metrics for one user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub sex: Option<Sex>,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub goal: Goal,
    /// Explicit calorie target; overrides the computed one.
    #[serde(default)]
    pub calorie_target: Option<u32>,
}

impl UserProfile {
    /// Daily targets, from `calorie_target` if set, otherwise Mifflin-St Jeor
    /// BMR scaled by activity level and adjusted for the goal.
    ///
    /// Returns `None` when neither an explicit target nor the full set of
    /// body metrics is available.
    pub fn macro_targets(&self) -> Option<MacroTargets> {
        if let Some(calories) = self.calorie_target {
            return Some(MacroTargets::from_calories(calories));
        }

        let weight = self.weight_kg?;
        let height = self.height_cm?;
        let age = f64::from(self.age?);
        let sex_offset = match self.sex? {
            Sex::Male => 5.0,
            Sex::Female => -161.0,
        };

        let bmr = 10.0 * weight + 6.25 * height - 5.0 * age + sex_offset;
        let tdee = bmr * self.activity_level.factor() + self.goal.calorie_adjustment();
        Some(MacroTargets::from_calories(
            tdee.max(MIN_DAILY_CALORIES).round() as u32,
        ))
    }

    /// Allergies and restrictions, normalised, for prompt and cache-key use.
    pub(crate) fn normalized_allergies(&self) -> Vec<String> {
        normalized_list(&self.allergies)
    }

    pub(crate) fn normalized_restrictions(&self) -> Vec<String> {
        normalized_list(&self.dietary_restrictions)
    }
}

/// Trim, lowercase, drop empties, sort and de-duplicate.
pub(crate) fn normalized_list(items: &[String]) -> Vec<String> {
    let mut out: Vec<String> = items
        .iter()
        .map(|s| normalize_name(s))
        .filter(|s| !s.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}
