//! Spoonacular recipe API client (RapidAPI-hosted).
//!
//! Requests carry `X-RapidAPI-Key` / `X-RapidAPI-Host` headers. The base URL
//! is derived from the host unless overridden (wiremock in tests).
//! See: <https://spoonacular.com/food-api/docs>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::{check_response, decode_error, transport_error};
use super::traits::{FindOptions, RecipeSource};
use crate::types::{
    ComplexSearchQuery, MacroBreakdown, Meal, MealPlanRequest, PlannedDay, RecipeDetails,
    RecipeMatch, SearchResults, TimeFrame,
};
use crate::{LarderError, Result};

/// Default RapidAPI host for Spoonacular.
pub const DEFAULT_HOST: &str = "spoonacular-recipe-food-nutrition-v1.p.rapidapi.com";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Spoonacular recipe API.
#[derive(Clone)]
pub struct SpoonacularClient {
    api_key: String,
    host: String,
    base_url: String,
    http: Client,
}

impl SpoonacularClient {
    /// Client for the default RapidAPI host.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_host(api_key, DEFAULT_HOST)
    }

    /// Client for a specific RapidAPI host; requests go to `https://{host}`.
    pub fn with_host(api_key: impl Into<String>, host: impl Into<String>) -> Self {
        let host = host.into();
        let base_url = format!("https://{host}");
        Self::with_base_url(api_key, host, base_url)
    }

    /// Client with an explicit base URL (for testing with wiremock).
    pub fn with_base_url(
        api_key: impl Into<String>,
        host: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            host: host.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: build_http(DEFAULT_TIMEOUT),
        }
    }

    /// Override the request timeout (default 30s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http = build_http(timeout);
        self
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "spoonacular request");

        let response = self
            .http
            .get(&url)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", &self.host)
            .query(query)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_response(response).await?;
        response
            .json()
            .await
            .map_err(decode_error)
    }
}

fn build_http(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_default()
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanMeal {
    id: u64,
    title: String,
    #[serde(default)]
    ready_in_minutes: Option<u32>,
    #[serde(default)]
    servings: Option<u32>,
}

#[derive(Deserialize, Default)]
struct PlanNutrients {
    #[serde(default)]
    calories: f64,
    #[serde(default)]
    protein: f64,
    #[serde(default)]
    fat: f64,
    #[serde(default)]
    carbohydrates: f64,
}

#[derive(Deserialize)]
struct PlanDay {
    #[serde(default)]
    meals: Vec<PlanMeal>,
    #[serde(default)]
    nutrients: Option<PlanNutrients>,
}

#[derive(Deserialize)]
struct PlanWeek {
    week: Week,
}

#[derive(Deserialize)]
struct Week {
    monday: Option<PlanDay>,
    tuesday: Option<PlanDay>,
    wednesday: Option<PlanDay>,
    thursday: Option<PlanDay>,
    friday: Option<PlanDay>,
    saturday: Option<PlanDay>,
    sunday: Option<PlanDay>,
}

impl PlanDay {
    fn into_planned(self, label: &str) -> PlannedDay {
        PlannedDay {
            label: label.to_string(),
            meals: self
                .meals
                .into_iter()
                .map(|m| Meal {
                    ready_in_minutes: m.ready_in_minutes,
                    servings: m.servings,
                    source_recipe_id: Some(m.id),
                    ..Meal::new(m.title)
                })
                .collect(),
            totals: self.nutrients.map(|n| MacroBreakdown {
                calories: n.calories,
                protein: n.protein,
                carbs: n.carbohydrates,
                fat: n.fat,
            }),
        }
    }
}

// ============================================================================
// Provider Trait Implementation
// ============================================================================

#[async_trait]
impl RecipeSource for SpoonacularClient {
    fn name(&self) -> &str {
        "spoonacular"
    }

    #[instrument(skip(self), fields(source = "spoonacular"))]
    async fn find_by_ingredients(
        &self,
        ingredients: &[String],
        options: FindOptions,
    ) -> Result<Vec<RecipeMatch>> {
        if ingredients.is_empty() {
            return Err(LarderError::InvalidInput(
                "at least one ingredient is required".to_string(),
            ));
        }

        let query = [
            ("ingredients", ingredients.join(",")),
            ("number", options.number.to_string()),
            ("ranking", options.ranking.as_param().to_string()),
            ("ignorePantry", options.ignore_pantry.to_string()),
        ];
        let recipes: Vec<RecipeMatch> = self.get("/recipes/findByIngredients", &query).await?;

        Ok(recipes
            .into_iter()
            .map(RecipeMatch::with_match_percentage)
            .collect())
    }

    #[instrument(skip(self), fields(source = "spoonacular"))]
    async fn recipe_details(&self, id: u64) -> Result<RecipeDetails> {
        let path = format!("/recipes/{id}/information");
        self.get(&path, &[("includeNutrition", "true".to_string())])
            .await
    }

    #[instrument(skip(self), fields(source = "spoonacular"))]
    async fn complex_search(&self, query: &ComplexSearchQuery) -> Result<SearchResults> {
        self.get("/recipes/complexSearch", &query.to_query_pairs())
            .await
    }

    #[instrument(skip(self, request), fields(source = "spoonacular", time_frame = request.time_frame.as_str()))]
    async fn generate_meal_plan(&self, request: &MealPlanRequest) -> Result<Vec<PlannedDay>> {
        let mut query = vec![("timeFrame", request.time_frame.as_str().to_string())];
        if let Some(calories) = request.effective_target_calories() {
            query.push(("targetCalories", calories.to_string()));
        }
        if let Some(diet) = request.effective_diet() {
            query.push(("diet", diet));
        }
        let exclude = request.effective_exclude();
        if !exclude.is_empty() {
            query.push(("exclude", exclude.join(",")));
        }

        match request.time_frame {
            TimeFrame::Day => {
                let day: PlanDay = self.get("/mealplanner/generate", &query).await?;
                Ok(vec![day.into_planned("day")])
            }
            TimeFrame::Week => {
                let plan: PlanWeek = self.get("/mealplanner/generate", &query).await?;
                let week = plan.week;
                Ok([
                    ("monday", week.monday),
                    ("tuesday", week.tuesday),
                    ("wednesday", week.wednesday),
                    ("thursday", week.thursday),
                    ("friday", week.friday),
                    ("saturday", week.saturday),
                    ("sunday", week.sunday),
                ]
                .into_iter()
                .filter_map(|(label, day)| day.map(|d| d.into_planned(label)))
                .collect())
            }
        }
    }
}
