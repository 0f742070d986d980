//! Tests for loading the CLI config and secrets files.
#![cfg(feature = "cli")]

use std::io::Write;
use std::time::Duration;

use larder::config::file::{Config, Credential, Secrets};
use larder::{AiProvider, ApiSource};
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn load_explicit_config_file() {
    let file = write_temp(
        r#"
        [orchestrator]
        prefer_api = false
        default_api_source = "edamam"
        cache_ttl_ms = 60000

        [cache]
        max_entries = 25

        [spoonacular]
        host = "spoonacular.internal"
        timeout_secs = 5

        [ai]
        provider = "openai"
        model = "gpt-4o"
        "#,
    );

    let config = Config::load(Some(file.path())).unwrap();
    let recipe = config.recipe_config();
    assert!(!recipe.prefer_api);
    assert!(recipe.fallback_to_ai);
    assert_eq!(recipe.default_api_source, ApiSource::Edamam);
    assert_eq!(recipe.cache_ttl, Duration::from_secs(60));

    let cache = config.cache_config();
    assert_eq!(cache.max_entries, 25);
    assert_eq!(cache.ttl, Duration::from_secs(60));

    assert_eq!(config.spoonacular.host.as_deref(), Some("spoonacular.internal"));
    assert_eq!(config.spoonacular.timeout_secs, 5);
    let ai = config.ai.unwrap();
    assert_eq!(ai.provider, AiProvider::OpenAi);
    assert_eq!(ai.model.as_deref(), Some("gpt-4o"));
}

#[test]
fn malformed_config_is_a_configuration_error() {
    let file = write_temp("[orchestrator\nprefer_api = ");
    let err = Config::load(Some(file.path())).unwrap_err().to_string();
    assert!(err.contains("Failed to parse config file"));
}

#[cfg(unix)]
mod permissions {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    const SECRETS: &str = r#"
        [spoonacular]
        api_key = "rapid-key"

        [gemini]
        api_key = "gm-key"
    "#;

    #[test]
    fn private_secrets_file_loads() {
        let file = write_temp(SECRETS);
        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o600)).unwrap();

        let secrets = Secrets::load_from_file(file.path()).unwrap();
        assert_eq!(
            secrets.api_key(Credential::Spoonacular).as_deref(),
            Some("rapid-key")
        );
        assert_eq!(
            secrets.api_key(Credential::Ai(AiProvider::Gemini)).as_deref(),
            Some("gm-key")
        );
    }

    #[test]
    fn readable_secrets_file_rejected() {
        let file = write_temp(SECRETS);
        fs::set_permissions(file.path(), fs::Permissions::from_mode(0o644)).unwrap();

        let err = Secrets::load_from_file(file.path())
            .unwrap_err()
            .to_string();
        assert!(err.contains("insecure permissions"));
    }
}
