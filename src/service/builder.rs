//! Builder for configuring a [`RecipeService`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use super::RecipeService;
use super::validate::{DietaryValidator, ResultValidator};
use crate::cache::{ApiCache, CacheConfig};
use crate::config::{ApiSource, ConfigManager, RecipeApiConfig};
use crate::providers::{AiProvider, MealGenerator, RecipeSource, SpoonacularClient};
use crate::{LarderError, Result};

/// Main entry point for creating recipe services.
pub struct Larder;

impl Larder {
    /// Create a new builder for configuring the service.
    pub fn builder() -> LarderBuilder {
        LarderBuilder::new()
    }
}

/// Builder for configuring recipe services.
pub struct LarderBuilder {
    spoonacular_key: Option<String>,
    spoonacular_host: Option<String>,
    sources: HashMap<ApiSource, Arc<dyn RecipeSource>>,
    ai: Option<(AiProvider, Option<String>)>,
    generator: Option<Arc<dyn MealGenerator>>,
    config: Option<RecipeApiConfig>,
    config_manager: Option<Arc<ConfigManager>>,
    cache: CacheConfig,
    validator: Option<Arc<dyn ResultValidator>>,
    timeout: Option<Duration>,
}

impl Default for LarderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LarderBuilder {
    pub fn new() -> Self {
        Self {
            spoonacular_key: None,
            spoonacular_host: None,
            sources: HashMap::new(),
            ai: None,
            generator: None,
            config: None,
            config_manager: None,
            cache: CacheConfig::default(),
            validator: None,
            timeout: None,
        }
    }

    /// Configure the Spoonacular recipe source (RapidAPI key).
    pub fn spoonacular(mut self, api_key: impl Into<String>) -> Self {
        self.spoonacular_key = Some(api_key.into());
        self
    }

    /// Override the RapidAPI host used for Spoonacular.
    pub fn spoonacular_host(mut self, host: impl Into<String>) -> Self {
        self.spoonacular_host = Some(host.into());
        self
    }

    /// Register a custom recipe source, replacing any previous one for `id`.
    pub fn recipe_source(mut self, id: ApiSource, source: Arc<dyn RecipeSource>) -> Self {
        self.sources.insert(id, source);
        self
    }

    /// Use one of the built-in AI providers for fallback generation.
    ///
    /// A missing credential is not an error here; generation will fail with
    /// a configuration error when the fallback is actually needed.
    pub fn ai_provider(mut self, provider: AiProvider, credential: Option<String>) -> Self {
        self.ai = Some((provider, credential));
        self
    }

    /// Use a custom meal generator. Takes precedence over [`ai_provider`](Self::ai_provider).
    pub fn meal_generator(mut self, generator: Arc<dyn MealGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Initial orchestrator configuration.
    pub fn config(mut self, config: RecipeApiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share an existing configuration manager. Takes precedence over
    /// [`config`](Self::config).
    pub fn config_manager(mut self, manager: Arc<ConfigManager>) -> Self {
        self.config_manager = Some(manager);
        self
    }

    /// Cache capacity and default TTL.
    pub fn cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Result validator (default: [`DietaryValidator`]).
    pub fn validator(mut self, validator: Arc<dyn ResultValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Request timeout for the built-in Spoonacular client.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the service.
    pub fn build(self) -> Result<RecipeService> {
        let mut sources = self.sources;

        if let Some(key) = self.spoonacular_key {
            if key.trim().is_empty() {
                return Err(LarderError::Configuration(
                    "Spoonacular API key is empty".to_string(),
                ));
            }
            let mut client = match self.spoonacular_host {
                Some(host) => SpoonacularClient::with_host(key, host),
                None => SpoonacularClient::new(key),
            };
            if let Some(timeout) = self.timeout {
                client = client.timeout(timeout);
            }
            sources
                .entry(ApiSource::Spoonacular)
                .or_insert_with(|| Arc::new(client));
        }

        let generator = self
            .generator
            .or_else(|| self.ai.map(|(provider, credential)| provider.build(credential)));

        // Must have somewhere to get answers from
        if sources.is_empty() && generator.is_none() {
            return Err(LarderError::Configuration(
                "no recipe source or AI generator configured".to_string(),
            ));
        }

        let config = self.config_manager.unwrap_or_else(|| {
            Arc::new(ConfigManager::with_config(self.config.unwrap_or_default()))
        });

        Ok(RecipeService::new(
            config,
            ApiCache::new(&self.cache),
            sources,
            generator,
            self.validator
                .unwrap_or_else(|| Arc::new(DietaryValidator)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_a_backend() {
        let err = Larder::builder().build().err().unwrap();
        assert!(matches!(err, LarderError::Configuration(_)));
    }

    #[test]
    fn build_rejects_blank_spoonacular_key() {
        assert!(Larder::builder().spoonacular("  ").build().is_err());
    }

    #[test]
    fn build_registers_spoonacular() {
        let service = Larder::builder().spoonacular("key").build().unwrap();
        assert_eq!(service.sources(), vec![ApiSource::Spoonacular]);
        assert!(!service.has_generator());
    }

    #[test]
    fn ai_only_service_builds() {
        let service = Larder::builder()
            .ai_provider(AiProvider::Gemini, None)
            .config(RecipeApiConfig {
                prefer_api: false,
                ..Default::default()
            })
            .build()
            .unwrap();
        assert!(service.has_generator());
        assert!(!service.config().get_config().prefer_api);
    }

    #[test]
    fn shared_config_manager_is_used() {
        let manager = Arc::new(ConfigManager::new());
        let service = Larder::builder()
            .spoonacular("key")
            .config_manager(manager.clone())
            .build()
            .unwrap();
        assert!(Arc::ptr_eq(service.config(), &manager));
    }
}
