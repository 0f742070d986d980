//! Larder - recipe recommendations and meal plans for a home pantry
//!
//! This crate turns "what's in my pantry" into recipe suggestions and meal
//! plans. Answers come from a recipe API (Spoonacular) when it has
//! something usable, and from an AI meal generator (OpenAI or Gemini)
//! otherwise. Results are cached in memory with a TTL and a size bound.
//!
//! # Example
//!
//! ```rust,no_run
//! use larder::{AiProvider, FindRecipesRequest, Larder, RecipeSuggestions};
//!
//! #[tokio::main]
//! async fn main() -> larder::Result<()> {
//!     let service = Larder::builder()
//!         .spoonacular("rapidapi-key")
//!         .ai_provider(AiProvider::OpenAi, Some("sk-your-key".into()))
//!         .build()?;
//!
//!     let request = FindRecipesRequest::new(["eggs", "spinach", "feta"]);
//!     match service.find_recipes(&request).await? {
//!         RecipeSuggestions::Api { recipes, .. } => {
//!             for recipe in recipes {
//!                 println!("{} ({}% match)", recipe.title, recipe.match_percentage);
//!             }
//!         }
//!         RecipeSuggestions::Ai { meals, .. } => {
//!             for meal in meals {
//!                 println!("{}", meal.name);
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Runtime configuration
//!
//! ```rust
//! use std::time::Duration;
//! use larder::config::{ConfigManager, RecipeApiConfigUpdate};
//!
//! let manager = ConfigManager::new();
//! manager.set_config(RecipeApiConfigUpdate::new().cache_ttl(Duration::from_millis(500)));
//!
//! let config = manager.get_config();
//! assert_eq!(config.cache_ttl, Duration::from_millis(500));
//! assert!(config.prefer_api);
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod providers;
pub mod service;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use config::{ApiSource, ConfigManager, RecipeApiConfig, RecipeApiConfigUpdate};
pub use error::{LarderError, Result};
pub use providers::{AiProvider, MealGenerator, RecipeSource};
pub use service::{Larder, LarderBuilder, RecipeService};

// Re-export all types
pub use types::{
    ActivityLevel, ComplexSearchQuery, FindRecipesRequest, Goal, IngredientRef, JobState,
    JobStatus, JobUpdate, MacroBreakdown, MacroTargets, Meal, MealIngredient, MealPlan,
    MealPlanRequest, Nutrient, Nutrition, Origin, PantryItem, PlannedDay, Ranking,
    RecipeDetails, RecipeMatch, RecipeSuggestions, SearchHit, SearchResults, Sex, TimeFrame,
    UserProfile, match_percentage,
};
