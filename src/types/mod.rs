//! Public types for the Larder API.

mod job;
mod meal;
mod pantry;
mod recipe;
mod request;

pub use job::{JobState, JobStatus, JobUpdate};
pub use meal::{MacroBreakdown, Meal, MealIngredient};
pub use pantry::{ActivityLevel, Goal, MacroTargets, PantryItem, Sex, UserProfile};
pub use recipe::{
    ComplexSearchQuery, IngredientRef, Nutrient, Nutrition, RecipeDetails, RecipeMatch,
    SearchHit, SearchResults, match_percentage,
};
pub use request::{
    FindRecipesRequest, MealPlan, MealPlanRequest, Origin, PlannedDay, Ranking,
    RecipeSuggestions, TimeFrame,
};

pub(crate) use pantry::{normalize_name, pantry_covers};
