//! Configuration files for the `larder` CLI.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.larder/config.toml` (user)
//! 3. `/etc/larder/config.toml` (system)
//!
//! When no file exists the built-in defaults apply.
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.larder/secrets.toml` (user, must be 0600)
//! 2. `/etc/larder/secrets.toml` (system, must be 0600)
//!
//! Keys missing from the secrets file fall back to `SPOONACULAR_API_KEY`,
//! `OPENAI_API_KEY` and `GEMINI_API_KEY`.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{ApiSource, RecipeApiConfig};
use crate::cache::CacheConfig;
use crate::providers::AiProvider;
use crate::{LarderError, Result};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub spoonacular: SpoonacularSection,
    #[serde(default)]
    pub ai: Option<AiSection>,
}

/// Orchestrator policy, mirroring [`RecipeApiConfig`].
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorConfig {
    #[serde(default = "default_true")]
    pub prefer_api: bool,
    #[serde(default = "default_true")]
    pub enhance_ai_recipes: bool,
    #[serde(default = "default_true")]
    pub fallback_to_ai: bool,
    #[serde(default = "default_true")]
    pub validate_results: bool,
    #[serde(default)]
    pub default_api_source: ApiSource,
    /// Cache TTL in milliseconds (default: 3600000).
    #[serde(default = "default_cache_ttl_ms")]
    pub cache_ttl_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            prefer_api: true,
            enhance_ai_recipes: true,
            fallback_to_ai: true,
            validate_results: true,
            default_api_source: ApiSource::default(),
            cache_ttl_ms: default_cache_ttl_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_cache_ttl_ms() -> u64 {
    3_600_000
}

/// Cache sizing.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Maximum cached results (default: 100).
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
        }
    }
}

fn default_max_entries() -> usize {
    100
}

/// Spoonacular client settings.
#[derive(Debug, Clone, Deserialize)]
pub struct SpoonacularSection {
    /// RapidAPI host (default: the public Spoonacular host).
    #[serde(default)]
    pub host: Option<String>,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for SpoonacularSection {
    fn default() -> Self {
        Self {
            host: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// AI fallback provider.
#[derive(Debug, Clone, Deserialize)]
pub struct AiSection {
    pub provider: AiProvider,
    /// Model override; the provider default is used when absent.
    #[serde(default)]
    pub model: Option<String>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided, must exist)
    /// 2. `~/.larder/config.toml`
    /// 3. `/etc/larder/config.toml`
    ///
    /// Returns the defaults if no file is found.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Config::default()),
        }
    }

    /// Load and parse a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LarderError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            LarderError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(LarderError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        Ok(standard_paths("config.toml").find(|path| path.exists()))
    }

    /// The orchestrator configuration this file describes.
    pub fn recipe_config(&self) -> RecipeApiConfig {
        let o = &self.orchestrator;
        RecipeApiConfig {
            prefer_api: o.prefer_api,
            enhance_ai_recipes: o.enhance_ai_recipes,
            fallback_to_ai: o.fallback_to_ai,
            validate_results: o.validate_results,
            default_api_source: o.default_api_source,
            cache_ttl: Duration::from_millis(o.cache_ttl_ms),
        }
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new()
            .max_entries(self.cache.max_entries)
            .ttl(Duration::from_millis(self.orchestrator.cache_ttl_ms))
    }
}

/// `~/.larder/<name>` then `/etc/larder/<name>`.
fn standard_paths(name: &str) -> impl Iterator<Item = PathBuf> {
    let user = dirs::home_dir().map(|home| home.join(".larder").join(name));
    user.into_iter()
        .chain(std::iter::once(Path::new("/etc/larder").join(name)))
}

/// A service that needs an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential {
    Spoonacular,
    Ai(AiProvider),
}

impl Credential {
    pub fn env_var(self) -> &'static str {
        match self {
            Credential::Spoonacular => "SPOONACULAR_API_KEY",
            Credential::Ai(provider) => provider.env_var(),
        }
    }
}

/// API keys from `secrets.toml`, one `[service] api_key = "..."` table each.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    spoonacular: Option<KeyTable>,
    #[serde(default)]
    openai: Option<KeyTable>,
    #[serde(default)]
    gemini: Option<KeyTable>,
}

#[derive(Debug, Clone, Deserialize)]
struct KeyTable {
    api_key: String,
}

impl Secrets {
    /// Load the first secrets file found in the standard locations, or empty
    /// secrets when there is none.
    pub fn load() -> Result<Self> {
        match standard_paths("secrets.toml").find(|path| path.exists()) {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load a secrets file. On unix it must not be readable by group or others.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        ensure_private(path)?;
        let content = fs::read_to_string(path).map_err(|e| {
            LarderError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            LarderError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Key for `credential`: the file entry if non-blank, else its env var.
    pub fn api_key(&self, credential: Credential) -> Option<String> {
        let table = match credential {
            Credential::Spoonacular => &self.spoonacular,
            Credential::Ai(AiProvider::OpenAi) => &self.openai,
            Credential::Ai(AiProvider::Gemini) => &self.gemini,
        };
        table
            .as_ref()
            .map(|t| t.api_key.clone())
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(credential.env_var()).ok())
    }
}

#[cfg(unix)]
fn ensure_private(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = fs::metadata(path)
        .map_err(|e| {
            LarderError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?
        .permissions()
        .mode();
    if mode & 0o077 != 0 {
        return Err(LarderError::Configuration(format!(
            "Secrets file {path:?} has insecure permissions {:o}, expected 0600",
            mode & 0o777
        )));
    }
    Ok(())
}

#[cfg(not(unix))]
fn ensure_private(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_recipe_defaults() {
        let config = Config::default();
        assert_eq!(config.recipe_config(), RecipeApiConfig::default());
        assert_eq!(config.cache.max_entries, 100);
        assert_eq!(config.spoonacular.timeout_secs, 30);
        assert!(config.ai.is_none());
    }

    #[test]
    fn parse_partial_config() {
        let toml = r#"
            [orchestrator]
            fallback_to_ai = false
            cache_ttl_ms = 500

            [ai]
            provider = "gemini"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let recipe = config.recipe_config();
        assert!(!recipe.fallback_to_ai);
        assert!(recipe.prefer_api);
        assert_eq!(recipe.cache_ttl, Duration::from_millis(500));
        assert_eq!(config.ai.unwrap().provider, AiProvider::Gemini);
    }

    #[test]
    fn unknown_api_source_rejected() {
        let toml = r#"
            [orchestrator]
            default_api_source = "allrecipes"
        "#;
        assert!(toml::from_str::<Config>(toml).is_err());
    }

    #[test]
    fn parse_secrets() {
        let toml = r#"
            [spoonacular]
            api_key = "rapid-key"

            [openai]
            api_key = "sk-test"
        "#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(
            secrets.api_key(Credential::Spoonacular).as_deref(),
            Some("rapid-key")
        );
        assert_eq!(
            secrets.api_key(Credential::Ai(AiProvider::OpenAi)).as_deref(),
            Some("sk-test")
        );
        assert!(secrets.gemini.is_none());
    }

    #[test]
    fn credential_env_vars() {
        assert_eq!(Credential::Spoonacular.env_var(), "SPOONACULAR_API_KEY");
        assert_eq!(
            Credential::Ai(AiProvider::Gemini).env_var(),
            "GEMINI_API_KEY"
        );
    }

    #[test]
    fn config_not_found_returns_error() {
        let err = Config::load(Some(Path::new("/nonexistent/larder.toml")))
            .unwrap_err()
            .to_string();
        assert!(err.contains("Config file not found"));
    }
}
