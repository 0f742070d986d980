//! The four cached operations, expressed uniformly so the orchestrator can
//! run one resolution policy over all of them.

use async_trait::async_trait;
use serde_json::Value;

use super::parse::{enhance_meals, parse_meals, parse_plan_days};
use super::prompt::{meal_plan_prompt, recipes_prompt};
use super::validate::{ResultValidator, ValidationContext, Verdict};
use crate::cache::generate_key;
use crate::config::ApiSource;
use crate::providers::{FindOptions, RecipeSource};
use crate::types::{
    ComplexSearchQuery, FindRecipesRequest, Meal, MealPlan, MealPlanRequest, Origin,
    RecipeDetails, RecipeSuggestions, SearchResults, normalize_name,
};
use crate::Result;

/// Values stored in the orchestrator's cache.
#[derive(Debug, Clone)]
pub(crate) enum CachedValue {
    Suggestions(RecipeSuggestions),
    MealPlan(MealPlan),
    Details(RecipeDetails),
    Search(SearchResults),
}

#[async_trait]
pub(crate) trait Operation: Send + Sync {
    type Output: Clone + Send + Sync;

    /// Metric/tracing label.
    const NAME: &'static str;

    fn cache_key(&self) -> String;

    fn into_cached(output: Self::Output) -> CachedValue;

    fn from_cached(value: CachedValue) -> Option<Self::Output>;

    async fn call_source(&self, source: &dyn RecipeSource, id: ApiSource) -> Result<Self::Output>;

    /// An empty result counts as "no usable result".
    fn is_empty(_output: &Self::Output) -> bool {
        false
    }

    fn validate(&self, _validator: &dyn ResultValidator, _output: &Self::Output) -> Verdict {
        Ok(())
    }

    /// Generator prompt; `None` when the operation has no AI path.
    fn prompt(&self) -> Option<String> {
        None
    }

    fn from_generated(&self, _json: &str, _provider: &str, _enhance: bool) -> Result<Self::Output> {
        Err(crate::LarderError::Configuration(format!(
            "{} has no AI path",
            Self::NAME
        )))
    }
}

pub(crate) struct FindRecipes<'a>(pub &'a FindRecipesRequest);

#[async_trait]
impl Operation for FindRecipes<'_> {
    type Output = RecipeSuggestions;
    const NAME: &'static str = "find_recipes";

    fn cache_key(&self) -> String {
        self.0.cache_key()
    }

    fn into_cached(output: Self::Output) -> CachedValue {
        CachedValue::Suggestions(output)
    }

    fn from_cached(value: CachedValue) -> Option<Self::Output> {
        match value {
            CachedValue::Suggestions(s) => Some(s),
            _ => None,
        }
    }

    async fn call_source(&self, source: &dyn RecipeSource, id: ApiSource) -> Result<Self::Output> {
        let request = self.0;
        let options = FindOptions {
            number: request.number,
            ranking: request.ranking,
            ignore_pantry: request.ignore_pantry,
        };
        let recipes = source
            .find_by_ingredients(&request.normalized_ingredients(), options)
            .await?;
        Ok(RecipeSuggestions::Api {
            source: id,
            recipes,
        })
    }

    fn is_empty(output: &Self::Output) -> bool {
        output.is_empty()
    }

    fn validate(&self, validator: &dyn ResultValidator, output: &Self::Output) -> Verdict {
        let ctx = ValidationContext::new(self.0.profile.as_ref(), &[]);
        match output {
            RecipeSuggestions::Api { recipes, .. } => validator.validate_recipes(recipes, &ctx),
            RecipeSuggestions::Ai { meals, .. } => validator.validate_meals(meals, &ctx),
        }
    }

    fn prompt(&self) -> Option<String> {
        Some(recipes_prompt(self.0))
    }

    fn from_generated(&self, json: &str, provider: &str, enhance: bool) -> Result<Self::Output> {
        let mut meals = parse_meals(json)?;
        if enhance {
            meals = enhance_meals(meals, &self.0.normalized_ingredients());
        }
        if self.0.number > 0 {
            meals.truncate(self.0.number as usize);
        }
        Ok(RecipeSuggestions::Ai {
            provider: provider.to_string(),
            meals,
        })
    }
}

pub(crate) struct PlanMeals<'a>(pub &'a MealPlanRequest);

#[async_trait]
impl Operation for PlanMeals<'_> {
    type Output = MealPlan;
    const NAME: &'static str = "meal_plan";

    fn cache_key(&self) -> String {
        self.0.cache_key()
    }

    fn into_cached(output: Self::Output) -> CachedValue {
        CachedValue::MealPlan(output)
    }

    fn from_cached(value: CachedValue) -> Option<Self::Output> {
        match value {
            CachedValue::MealPlan(plan) => Some(plan),
            _ => None,
        }
    }

    async fn call_source(&self, source: &dyn RecipeSource, id: ApiSource) -> Result<Self::Output> {
        let days = source.generate_meal_plan(self.0).await?;
        Ok(MealPlan {
            origin: Origin::Api { source: id },
            days,
        })
    }

    fn is_empty(output: &Self::Output) -> bool {
        output.is_empty()
    }

    fn validate(&self, validator: &dyn ResultValidator, output: &Self::Output) -> Verdict {
        let meals: Vec<Meal> = output.meals().cloned().collect();
        let ctx = ValidationContext::new(self.0.profile.as_ref(), &self.0.exclude);
        validator.validate_meals(&meals, &ctx)
    }

    fn prompt(&self) -> Option<String> {
        Some(meal_plan_prompt(self.0))
    }

    fn from_generated(&self, json: &str, provider: &str, enhance: bool) -> Result<Self::Output> {
        let mut days = parse_plan_days(json, self.0.time_frame)?;
        if enhance {
            let pantry: Vec<String> = self.0.pantry.iter().map(|p| normalize_name(p)).collect();
            for day in &mut days {
                day.meals = enhance_meals(std::mem::take(&mut day.meals), &pantry);
            }
        }
        Ok(MealPlan {
            origin: Origin::Ai {
                provider: provider.to_string(),
            },
            days,
        })
    }
}

pub(crate) struct Details(pub u64);

#[async_trait]
impl Operation for Details {
    type Output = RecipeDetails;
    const NAME: &'static str = "recipe_details";

    fn cache_key(&self) -> String {
        generate_key(Self::NAME, [("id", Value::from(self.0))])
    }

    fn into_cached(output: Self::Output) -> CachedValue {
        CachedValue::Details(output)
    }

    fn from_cached(value: CachedValue) -> Option<Self::Output> {
        match value {
            CachedValue::Details(details) => Some(details),
            _ => None,
        }
    }

    async fn call_source(&self, source: &dyn RecipeSource, _id: ApiSource) -> Result<Self::Output> {
        source.recipe_details(self.0).await
    }
}

pub(crate) struct Search<'a>(pub &'a ComplexSearchQuery);

#[async_trait]
impl Operation for Search<'_> {
    type Output = SearchResults;
    const NAME: &'static str = "complex_search";

    fn cache_key(&self) -> String {
        let params: Vec<(String, Value)> = match serde_json::to_value(self.0) {
            Ok(Value::Object(map)) => map.into_iter().collect(),
            _ => Vec::new(),
        };
        generate_key(Self::NAME, params)
    }

    fn into_cached(output: Self::Output) -> CachedValue {
        CachedValue::Search(output)
    }

    fn from_cached(value: CachedValue) -> Option<Self::Output> {
        match value {
            CachedValue::Search(results) => Some(results),
            _ => None,
        }
    }

    async fn call_source(&self, source: &dyn RecipeSource, _id: ApiSource) -> Result<Self::Output> {
        source.complex_search(self.0).await
    }
}
