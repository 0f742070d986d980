//! The recipe orchestrator.
//!
//! [`RecipeService`] answers recipe and meal-plan requests from, in order:
//! the cache, the configured recipe API, and the AI meal generator. Which
//! of those are consulted is governed by the live [`RecipeApiConfig`]
//! snapshot taken at the start of each request.
//!
//! Concurrent misses for the same cache key are coalesced: the first caller
//! resolves upstream while later callers wait and then read its cached
//! result. Failures are never cached.

mod builder;
mod inflight;
mod operation;
mod parse;
mod prompt;
pub mod validate;

pub use builder::{Larder, LarderBuilder};
pub use validate::{AcceptAll, DietaryValidator, ResultValidator, ValidationContext, Verdict};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::try_join_all;
use tracing::{debug, instrument, warn};

use crate::cache::ApiCache;
use crate::config::{ApiSource, ConfigManager, RecipeApiConfig};
use crate::providers::{MealGenerator, RecipeSource};
use crate::telemetry;
use crate::types::{
    ComplexSearchQuery, FindRecipesRequest, MealPlan, MealPlanRequest, RecipeDetails,
    RecipeSuggestions, SearchResults,
};
use crate::{LarderError, Result};

use inflight::KeyedLocks;
use operation::{CachedValue, Details, FindRecipes, Operation, PlanMeals, Search};

/// Cache-first recipe orchestrator with API-then-AI fallback.
///
/// Build one with [`Larder::builder()`] and share it behind an `Arc`.
pub struct RecipeService {
    config: Arc<ConfigManager>,
    cache: ApiCache<CachedValue>,
    sources: HashMap<ApiSource, Arc<dyn RecipeSource>>,
    generator: Option<Arc<dyn MealGenerator>>,
    validator: Arc<dyn ResultValidator>,
    inflight: KeyedLocks,
}

impl RecipeService {
    pub(crate) fn new(
        config: Arc<ConfigManager>,
        cache: ApiCache<CachedValue>,
        sources: HashMap<ApiSource, Arc<dyn RecipeSource>>,
        generator: Option<Arc<dyn MealGenerator>>,
        validator: Arc<dyn ResultValidator>,
    ) -> Self {
        Self {
            config,
            cache,
            sources,
            generator,
            validator,
            inflight: KeyedLocks::new(),
        }
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Recipes for the request's ingredients.
    ///
    /// Returns API matches when the configured source yields a usable
    /// result, AI-generated meals otherwise (subject to configuration).
    #[instrument(skip(self, request), fields(operation = "find_recipes", ingredients = request.ingredients.len()))]
    pub async fn find_recipes(&self, request: &FindRecipesRequest) -> Result<RecipeSuggestions> {
        if request.normalized_ingredients().is_empty() {
            return Err(LarderError::InvalidInput(
                "at least one ingredient is required".to_string(),
            ));
        }
        self.run(&FindRecipes(request)).await
    }

    /// A day or week of meals.
    #[instrument(skip(self, request), fields(operation = "meal_plan", time_frame = request.time_frame.as_str()))]
    pub async fn generate_meal_plan(&self, request: &MealPlanRequest) -> Result<MealPlan> {
        self.run(&PlanMeals(request)).await
    }

    /// Full information for one recipe. API only, cached.
    #[instrument(skip(self), fields(operation = "recipe_details"))]
    pub async fn recipe_details(&self, id: u64) -> Result<RecipeDetails> {
        self.run(&Details(id)).await
    }

    /// Details for several recipes, fetched concurrently.
    ///
    /// Fails with the first error; details fetched before it stay cached.
    #[instrument(skip(self, ids), fields(operation = "recipe_details_batch", batch_size = ids.len()))]
    pub async fn recipe_details_batch(&self, ids: &[u64]) -> Result<Vec<RecipeDetails>> {
        try_join_all(ids.iter().map(|&id| self.recipe_details(id))).await
    }

    /// Paginated filtered search. API only, cached.
    #[instrument(skip(self, query), fields(operation = "complex_search"))]
    pub async fn search_recipes(&self, query: &ComplexSearchQuery) -> Result<SearchResults> {
        self.run(&Search(query)).await
    }

    // ========================================================================
    // Configuration and cache access
    // ========================================================================

    /// The shared configuration manager; updates apply to the next request.
    pub fn config(&self) -> &Arc<ConfigManager> {
        &self.config
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Number of cached results, expired ones included until they are read.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    /// Cached answer for `request`, without touching upstream or metrics.
    pub fn cached_recipes(&self, request: &FindRecipesRequest) -> Option<RecipeSuggestions> {
        self.peek(&FindRecipes(request))
    }

    /// Seed the cache with an answer for `request`.
    pub fn prime_recipes(&self, request: &FindRecipesRequest, suggestions: RecipeSuggestions) {
        self.store(&FindRecipes(request), suggestions, &self.config.snapshot());
    }

    /// Cached plan for `request`, without touching upstream or metrics.
    pub fn cached_meal_plan(&self, request: &MealPlanRequest) -> Option<MealPlan> {
        self.peek(&PlanMeals(request))
    }

    /// Seed the cache with a plan for `request`.
    pub fn prime_meal_plan(&self, request: &MealPlanRequest, plan: MealPlan) {
        self.store(&PlanMeals(request), plan, &self.config.snapshot());
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Registered recipe sources.
    pub fn sources(&self) -> Vec<ApiSource> {
        let mut sources: Vec<ApiSource> = self.sources.keys().copied().collect();
        sources.sort_by_key(|s| s.as_str());
        sources
    }

    // ========================================================================
    // Resolution policy
    // ========================================================================

    async fn run<O: Operation>(&self, op: &O) -> Result<O::Output> {
        let key = op.cache_key();
        if let Some(hit) = self.lookup::<O>(&key) {
            return Ok(hit);
        }

        let _guard = self.inflight.acquire(&key).await;
        if let Some(hit) = self.peek(op) {
            debug!(key = %key, "resolved by a concurrent request");
            return Ok(hit);
        }

        let config = self.config.snapshot();
        let output = self.resolve(op, &config).await?;
        self.store(op, output.clone(), &config);
        Ok(output)
    }

    async fn resolve<O: Operation>(&self, op: &O, config: &RecipeApiConfig) -> Result<O::Output> {
        let prompt = op.prompt();
        if !config.prefer_api {
            if let Some(prompt) = &prompt {
                return self.from_generator(op, prompt, config).await;
            }
        }

        let err = match self.from_source(op, config).await {
            Ok(output) => return Ok(output),
            Err(e) => e,
        };

        let Some(prompt) = prompt else {
            return Err(err);
        };
        if !config.fallback_to_ai || !err.is_fallback_trigger() {
            return Err(err);
        }

        let reason = fallback_reason(&err);
        warn!(operation = O::NAME, reason, error = %err, "recipe source gave no usable result, falling back to AI");
        metrics::counter!(telemetry::FALLBACKS_TOTAL,
            "operation" => O::NAME,
            "reason" => reason,
        )
        .increment(1);

        self.from_generator(op, &prompt, config).await
    }

    async fn from_source<O: Operation>(&self, op: &O, config: &RecipeApiConfig) -> Result<O::Output> {
        let id = config.default_api_source;
        let source = self
            .sources
            .get(&id)
            .ok_or(LarderError::SourceNotRegistered(id))?;

        let start = Instant::now();
        let result = op.call_source(source.as_ref(), id).await;
        Self::record_request(O::NAME, source.name(), start, result.is_ok());
        let output = result?;

        if O::is_empty(&output) {
            return Err(LarderError::NoResults);
        }
        if config.validate_results {
            op.validate(self.validator.as_ref(), &output)
                .map_err(LarderError::ValidationRejected)?;
        }
        Ok(output)
    }

    async fn from_generator<O: Operation>(
        &self,
        op: &O,
        prompt: &str,
        config: &RecipeApiConfig,
    ) -> Result<O::Output> {
        let generator = self.generator.as_ref().ok_or_else(|| {
            LarderError::Configuration("no AI meal generator is configured".to_string())
        })?;

        let start = Instant::now();
        let result = generator.generate_meal_json(prompt).await;
        Self::record_request(O::NAME, generator.name(), start, result.is_ok());

        let output = op.from_generated(&result?, generator.name(), config.enhance_ai_recipes)?;
        if O::is_empty(&output) {
            return Err(LarderError::NoResults);
        }
        if config.validate_results {
            op.validate(self.validator.as_ref(), &output)
                .map_err(LarderError::ValidationRejected)?;
        }
        Ok(output)
    }

    // ========================================================================
    // Cache helpers
    // ========================================================================

    fn lookup<O: Operation>(&self, key: &str) -> Option<O::Output> {
        match self.cache.get(key).and_then(O::from_cached) {
            Some(hit) => {
                debug!(key, "cache hit");
                metrics::counter!(telemetry::CACHE_HITS_TOTAL, "operation" => O::NAME).increment(1);
                Some(hit)
            }
            None => {
                debug!(key, "cache miss");
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "operation" => O::NAME)
                    .increment(1);
                None
            }
        }
    }

    fn peek<O: Operation>(&self, op: &O) -> Option<O::Output> {
        self.cache.get(&op.cache_key()).and_then(O::from_cached)
    }

    fn store<O: Operation>(&self, op: &O, output: O::Output, config: &RecipeApiConfig) {
        self.cache
            .set_with_ttl(op.cache_key(), O::into_cached(output), config.cache_ttl);
    }

    // ========================================================================
    // Metrics recording
    // ========================================================================

    fn record_request(operation: &'static str, source: &str, start: Instant, ok: bool) {
        let status = if ok { "ok" } else { "error" };
        let elapsed = start.elapsed().as_secs_f64();
        metrics::counter!(telemetry::REQUESTS_TOTAL,
            "source" => source.to_owned(),
            "operation" => operation,
            "status" => status,
        )
        .increment(1);
        metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS,
            "source" => source.to_owned(),
            "operation" => operation,
        )
        .record(elapsed);
    }
}

fn fallback_reason(err: &LarderError) -> &'static str {
    match err {
        LarderError::NoResults => "empty",
        LarderError::ValidationRejected(_) => "rejected",
        LarderError::SourceNotRegistered(_) => "unregistered",
        _ => "error",
    }
}
