//! Normalised recipe API records.

use serde::{Deserialize, Serialize};

use super::meal::MacroBreakdown;

/// Share of a recipe's ingredients already in the pantry, as a rounded
/// percentage. Zero when the recipe lists no ingredients at all.
///
/// ```rust
/// # use larder::types::match_percentage;
/// assert_eq!(match_percentage(3, 1), 75);
/// assert_eq!(match_percentage(0, 0), 0);
/// ```
pub fn match_percentage(used: u32, missed: u32) -> u8 {
    let total = u64::from(used) + u64::from(missed);
    if total == 0 {
        return 0;
    }
    (u64::from(used) as f64 / total as f64 * 100.0).round() as u8
}

/// Ingredient reference as returned by recipe APIs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRef {
    pub name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    /// Original ingredient line, e.g. "2 cups of flour".
    #[serde(default)]
    pub original: Option<String>,
}

/// A recipe matched against a list of pantry ingredients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeMatch {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub used_ingredient_count: u32,
    #[serde(default)]
    pub missed_ingredient_count: u32,
    #[serde(default)]
    pub used_ingredients: Vec<IngredientRef>,
    #[serde(default)]
    pub missed_ingredients: Vec<IngredientRef>,
    #[serde(default)]
    pub likes: u32,
    /// Filled in by the recipe source from the used/missed counts.
    #[serde(default)]
    pub match_percentage: u8,
}

impl RecipeMatch {
    /// Recompute `match_percentage` from the ingredient counts.
    pub fn with_match_percentage(mut self) -> Self {
        self.match_percentage =
            match_percentage(self.used_ingredient_count, self.missed_ingredient_count);
        self
    }

    /// Title and ingredient names, for dietary checks.
    pub(crate) fn dietary_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.title.as_str()).chain(
            self.used_ingredients
                .iter()
                .chain(&self.missed_ingredients)
                .map(|i| i.name.as_str()),
        )
    }
}

/// One nutrient line from a recipe's nutrition block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrient {
    pub name: String,
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    #[serde(default)]
    pub nutrients: Vec<Nutrient>,
}

impl Nutrition {
    /// Amount of the named nutrient (case-insensitive), if present.
    pub fn amount(&self, name: &str) -> Option<f64> {
        self.nutrients
            .iter()
            .find(|n| n.name.eq_ignore_ascii_case(name))
            .map(|n| n.amount)
    }

    /// Calories, protein, carbohydrates and fat per serving.
    pub fn macros(&self) -> MacroBreakdown {
        MacroBreakdown {
            calories: self.amount("Calories").unwrap_or_default(),
            protein: self.amount("Protein").unwrap_or_default(),
            carbs: self.amount("Carbohydrates").unwrap_or_default(),
            fat: self.amount("Fat").unwrap_or_default(),
        }
    }
}

/// Full recipe information, including nutrition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub extended_ingredients: Vec<IngredientRef>,
    #[serde(default)]
    pub diets: Vec<String>,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
}

/// Filters for a paginated recipe search.
///
/// List fields are sent comma-separated. `None`/empty fields are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexSearchQuery {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
    #[serde(default)]
    pub intolerances: Vec<String>,
    /// Dish type (`type` on the wire).
    #[serde(default, rename = "type")]
    pub dish_type: Option<String>,
    #[serde(default)]
    pub include_ingredients: Vec<String>,
    #[serde(default)]
    pub exclude_ingredients: Vec<String>,
    #[serde(default)]
    pub max_ready_time: Option<u32>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default = "default_search_number")]
    pub number: u32,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub add_recipe_information: bool,
    #[serde(default)]
    pub fill_ingredients: bool,
}

fn default_search_number() -> u32 {
    10
}

impl ComplexSearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            number: default_search_number(),
            ..Default::default()
        }
    }

    pub fn cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    pub fn diet(mut self, diet: impl Into<String>) -> Self {
        self.diet = Some(diet.into());
        self
    }

    pub fn intolerance(mut self, intolerance: impl Into<String>) -> Self {
        self.intolerances.push(intolerance.into());
        self
    }

    pub fn dish_type(mut self, dish_type: impl Into<String>) -> Self {
        self.dish_type = Some(dish_type.into());
        self
    }

    pub fn include_ingredient(mut self, ingredient: impl Into<String>) -> Self {
        self.include_ingredients.push(ingredient.into());
        self
    }

    pub fn exclude_ingredient(mut self, ingredient: impl Into<String>) -> Self {
        self.exclude_ingredients.push(ingredient.into());
        self
    }

    pub fn max_ready_time(mut self, minutes: u32) -> Self {
        self.max_ready_time = Some(minutes);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Page size and offset.
    pub fn page(mut self, number: u32, offset: u32) -> Self {
        self.number = number;
        self.offset = offset;
        self
    }

    pub fn add_recipe_information(mut self, value: bool) -> Self {
        self.add_recipe_information = value;
        self
    }

    pub fn fill_ingredients(mut self, value: bool) -> Self {
        self.fill_ingredients = value;
        self
    }

    /// Query-string pairs in wire form.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        let mut push_opt = |name: &'static str, value: &Option<String>| {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                pairs.push((name, v.to_string()));
            }
        };
        push_opt("query", &self.query);
        push_opt("cuisine", &self.cuisine);
        push_opt("diet", &self.diet);
        push_opt("type", &self.dish_type);
        push_opt("sort", &self.sort);

        for (name, list) in [
            ("intolerances", &self.intolerances),
            ("includeIngredients", &self.include_ingredients),
            ("excludeIngredients", &self.exclude_ingredients),
        ] {
            if !list.is_empty() {
                pairs.push((name, list.join(",")));
            }
        }
        if let Some(minutes) = self.max_ready_time {
            pairs.push(("maxReadyTime", minutes.to_string()));
        }
        pairs.push(("number", self.number.to_string()));
        pairs.push(("offset", self.offset.to_string()));
        pairs.push((
            "addRecipeInformation",
            self.add_recipe_information.to_string(),
        ));
        pairs.push(("fillIngredients", self.fill_ingredients.to_string()));
        pairs
    }
}

/// One hit of a [`ComplexSearchQuery`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
}

/// A page of search hits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub number: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl SearchResults {
    /// Whether another page exists after this one.
    pub fn has_more(&self) -> bool {
        let seen = u32::try_from(self.results.len()).unwrap_or(u32::MAX);
        self.offset.saturating_add(seen) < self.total_results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_more_saturates_on_huge_offset() {
        let page = SearchResults {
            results: vec![SearchHit {
                id: 1,
                title: "Pasta".into(),
                image: None,
                ready_in_minutes: None,
                servings: None,
            }],
            offset: u32::MAX,
            number: 1,
            total_results: u32::MAX,
        };
        assert!(!page.has_more());
    }

    #[test]
    fn match_percentage_rounds() {
        assert_eq!(match_percentage(3, 1), 75);
        assert_eq!(match_percentage(1, 2), 33);
        assert_eq!(match_percentage(2, 1), 67);
        assert_eq!(match_percentage(5, 0), 100);
        assert_eq!(match_percentage(0, 4), 0);
    }

    #[test]
    fn match_percentage_zero_denominator() {
        assert_eq!(match_percentage(0, 0), 0);
    }

    #[test]
    fn nutrition_macros() {
        let nutrition = Nutrition {
            nutrients: vec![
                Nutrient {
                    name: "Calories".into(),
                    amount: 520.0,
                    unit: "kcal".into(),
                },
                Nutrient {
                    name: "Protein".into(),
                    amount: 31.0,
                    unit: "g".into(),
                },
            ],
        };
        let macros = nutrition.macros();
        assert_eq!(macros.calories, 520.0);
        assert_eq!(macros.protein, 31.0);
        assert_eq!(macros.fat, 0.0);
        assert_eq!(nutrition.amount("calories"), Some(520.0));
    }

    #[test]
    fn search_query_pairs_skip_empty_fields() {
        let query = ComplexSearchQuery::new("pasta")
            .diet("vegetarian")
            .intolerance("gluten")
            .intolerance("dairy")
            .page(5, 10);
        let pairs = query.to_query_pairs();

        assert!(pairs.contains(&("query", "pasta".to_string())));
        assert!(pairs.contains(&("intolerances", "gluten,dairy".to_string())));
        assert!(pairs.contains(&("number", "5".to_string())));
        assert!(pairs.contains(&("offset", "10".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "cuisine"));
        assert!(!pairs.iter().any(|(k, _)| *k == "maxReadyTime"));
    }

    #[test]
    fn search_results_pagination() {
        let page = SearchResults {
            results: vec![SearchHit {
                id: 1,
                title: "a".into(),
                image: None,
                ready_in_minutes: None,
                servings: None,
            }],
            offset: 0,
            number: 1,
            total_results: 3,
        };
        assert!(page.has_more());
    }
}
