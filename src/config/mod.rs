//! Recipe-source policy configuration.
//!
//! [`RecipeApiConfig`] decides how [`RecipeService`](crate::service::RecipeService)
//! picks between the recipe API and the AI generator, whether results are
//! validated or enhanced, and how long they stay cached.
//!
//! [`ConfigManager`] owns the live configuration. Updates are partial
//! merges ([`RecipeApiConfigUpdate`]) that swap in a new immutable snapshot,
//! so a request that already read its snapshot is unaffected by a
//! concurrent update.

#[cfg(feature = "cli")]
pub mod file;

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{LarderError, Result};

/// Known recipe API sources.
///
/// Unknown identifiers are rejected when parsing, both through [`FromStr`]
/// and through serde.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiSource {
    #[default]
    Spoonacular,
    Edamam,
    TheMealDb,
}

impl ApiSource {
    /// Canonical lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiSource::Spoonacular => "spoonacular",
            ApiSource::Edamam => "edamam",
            ApiSource::TheMealDb => "themealdb",
        }
    }
}

impl fmt::Display for ApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiSource {
    type Err = LarderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spoonacular" => Ok(ApiSource::Spoonacular),
            "edamam" => Ok(ApiSource::Edamam),
            "themealdb" => Ok(ApiSource::TheMealDb),
            other => Err(LarderError::Configuration(format!(
                "unknown recipe source '{other}'"
            ))),
        }
    }
}

/// Policy flags for recipe source selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeApiConfig {
    /// Try the recipe API before the AI generator. Default: true.
    pub prefer_api: bool,
    /// Normalise AI-generated meals and annotate them with pantry coverage. Default: true.
    pub enhance_ai_recipes: bool,
    /// Use the AI generator when the API fails or returns nothing usable. Default: true.
    pub fallback_to_ai: bool,
    /// Run the configured validator over results before caching. Default: true.
    pub validate_results: bool,
    /// Recipe API consulted when `prefer_api` is set. Default: spoonacular.
    pub default_api_source: ApiSource,
    /// Lifetime of cached results. Default: one hour. Serialised in milliseconds.
    #[serde(with = "duration_ms")]
    pub cache_ttl: Duration,
}

impl Default for RecipeApiConfig {
    fn default() -> Self {
        Self {
            prefer_api: true,
            enhance_ai_recipes: true,
            fallback_to_ai: true,
            validate_results: true,
            default_api_source: ApiSource::default(),
            cache_ttl: Duration::from_millis(3_600_000),
        }
    }
}

impl RecipeApiConfig {
    /// Return a copy with every field present in `update` replaced.
    pub fn merged(&self, update: &RecipeApiConfigUpdate) -> Self {
        Self {
            prefer_api: update.prefer_api.unwrap_or(self.prefer_api),
            enhance_ai_recipes: update.enhance_ai_recipes.unwrap_or(self.enhance_ai_recipes),
            fallback_to_ai: update.fallback_to_ai.unwrap_or(self.fallback_to_ai),
            validate_results: update.validate_results.unwrap_or(self.validate_results),
            default_api_source: update.default_api_source.unwrap_or(self.default_api_source),
            cache_ttl: update.cache_ttl.unwrap_or(self.cache_ttl),
        }
    }
}

/// Partial update for [`RecipeApiConfig`]; absent fields keep their value.
///
/// Deserialising rejects unknown fields and unknown source identifiers.
///
/// ```rust
/// # use larder::config::RecipeApiConfigUpdate;
/// # use std::time::Duration;
/// let update = RecipeApiConfigUpdate::new()
///     .prefer_api(false)
///     .cache_ttl(Duration::from_millis(500));
/// assert_eq!(update.fallback_to_ai, None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RecipeApiConfigUpdate {
    pub prefer_api: Option<bool>,
    pub enhance_ai_recipes: Option<bool>,
    pub fallback_to_ai: Option<bool>,
    pub validate_results: Option<bool>,
    pub default_api_source: Option<ApiSource>,
    #[serde(default, with = "duration_ms::option")]
    pub cache_ttl: Option<Duration>,
}

impl RecipeApiConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an update from JSON text, e.g. `{"cacheTtl": 500}`.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| LarderError::Configuration(format!("invalid config update: {e}")))
    }

    pub fn prefer_api(mut self, value: bool) -> Self {
        self.prefer_api = Some(value);
        self
    }

    pub fn enhance_ai_recipes(mut self, value: bool) -> Self {
        self.enhance_ai_recipes = Some(value);
        self
    }

    pub fn fallback_to_ai(mut self, value: bool) -> Self {
        self.fallback_to_ai = Some(value);
        self
    }

    pub fn validate_results(mut self, value: bool) -> Self {
        self.validate_results = Some(value);
        self
    }

    pub fn default_api_source(mut self, source: ApiSource) -> Self {
        self.default_api_source = Some(source);
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }
}

/// Owner of the live [`RecipeApiConfig`].
///
/// Readers get either an owned copy ([`get_config`](Self::get_config)) or a
/// shared immutable snapshot ([`snapshot`](Self::snapshot)). Writers merge a
/// partial update and atomically replace the snapshot.
#[derive(Debug)]
pub struct ConfigManager {
    current: RwLock<Arc<RecipeApiConfig>>,
}

impl ConfigManager {
    /// Create a manager holding the default configuration.
    pub fn new() -> Self {
        Self::with_config(RecipeApiConfig::default())
    }

    /// Create a manager holding `config`.
    pub fn with_config(config: RecipeApiConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(config)),
        }
    }

    /// Merge `update` over the current configuration and return the result.
    pub fn set_config(&self, update: RecipeApiConfigUpdate) -> RecipeApiConfig {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        let next = current.merged(&update);
        debug!(?update, "recipe config updated");
        *current = Arc::new(next.clone());
        next
    }

    /// An owned copy of the current configuration.
    pub fn get_config(&self) -> RecipeApiConfig {
        self.snapshot().as_ref().clone()
    }

    /// The current immutable snapshot.
    pub fn snapshot(&self) -> Arc<RecipeApiConfig> {
        Arc::clone(&self.current.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Restore the default configuration.
    pub fn reset(&self) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = Arc::new(RecipeApiConfig::default());
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Serde adapter for `Duration` as integer milliseconds.
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }

    pub mod option {
        use std::time::Duration;

        use serde::{Deserialize, Deserializer};

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Duration>, D::Error> {
            Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
        }
    }
}
