//! Provider traits for recipe data and AI meal generation.
//!
//! Two capabilities, two traits:
//! - [`RecipeSource`]: a recipe API (pantry matching, details, search,
//!   meal-plan generation).
//! - [`MealGenerator`]: an LLM that turns a prompt into meal JSON text.
//!
//! The orchestrator holds them as `Arc<dyn ...>`, so tests substitute
//! in-memory implementations without any HTTP mocking.
//!
//! # Failure semantics
//!
//! Recipe sources report every failure as an error; the orchestrator decides
//! whether to fall back. Meal generators fail with `Configuration` when their
//! credential is missing, `Api` on a non-success status and `EmptyResponse`
//! on an empty completion.

use async_trait::async_trait;

use crate::Result;
use crate::types::{
    ComplexSearchQuery, MealPlanRequest, PlannedDay, RecipeDetails, RecipeMatch, Ranking,
    SearchResults,
};

/// Options for [`RecipeSource::find_by_ingredients`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    pub number: u32,
    pub ranking: Ranking,
    pub ignore_pantry: bool,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            number: 10,
            ranking: Ranking::default(),
            ignore_pantry: true,
        }
    }
}

/// A recipe API.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Source name for logging/metrics.
    fn name(&self) -> &str;

    /// Recipes that use the given ingredients, each with `match_percentage` filled in.
    async fn find_by_ingredients(
        &self,
        ingredients: &[String],
        options: FindOptions,
    ) -> Result<Vec<RecipeMatch>>;

    /// Full recipe information including nutrition.
    async fn recipe_details(&self, id: u64) -> Result<RecipeDetails>;

    /// Filtered, paginated search.
    async fn complex_search(&self, query: &ComplexSearchQuery) -> Result<SearchResults>;

    /// A generated meal plan, one [`PlannedDay`] per day.
    async fn generate_meal_plan(&self, request: &MealPlanRequest) -> Result<Vec<PlannedDay>>;
}

/// An AI provider producing meal/recipe JSON.
#[async_trait]
pub trait MealGenerator: Send + Sync {
    /// Provider name for logging/metrics.
    fn name(&self) -> &str;

    /// Raw JSON text for `prompt`, with markdown code fences removed.
    async fn generate_meal_json(&self, prompt: &str) -> Result<String>;
}
