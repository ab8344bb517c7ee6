//! Integration tests for layered configuration
//!
//! These tests verify that configuration loading follows the correct precedence:
//! CLI arguments > Environment variables > Config file > Defaults

use formqa_core::config::{
    BackendKind, CliConfigOverrides, ConfigSource, EmbedderKind, LayeredConfig,
    DEFAULT_CONFIG_FILE,
};
use formqa_core::FormqaError;
use serial_test::serial;
use std::env;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const ENV_KEYS: &[&str] = &[
    "FORMQA_BACKEND",
    "FORMQA_EMBEDDER",
    "FORMQA_TOP_K",
    "FORMQA_TIMEOUT_SECS",
    "FORMQA_STORE_ID",
    "FORMQA_QA_URL",
    "FORMQA_API_KEY",
    "AZURE_OPENAI_ENDPOINT",
    "AZURE_OPENAI_API_KEY",
    "AZURE_OPENAI_DEPLOYMENT_NAME",
];

fn clear_env() {
    for key in ENV_KEYS {
        env::remove_var(key);
    }
}

#[test]
fn test_file_overrides_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
embedder = "hashing"
timeout_secs = 30

[azure]
endpoint = "https://file.openai.azure.com"
chat_deployment = "gpt-file"
temperature = 0.5
"#
    )
    .unwrap();

    let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

    assert_eq!(config.embedder.value, EmbedderKind::Hashing);
    assert_eq!(config.embedder.source, ConfigSource::File);
    assert_eq!(config.timeout_secs.value, 30);
    assert_eq!(config.chat_temperature.value, 0.5);
    assert_eq!(config.azure_api_version.source, ConfigSource::Default);
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    clear_env();

    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "top_k = 3\nbackend = \"local\"").unwrap();

    env::set_var("FORMQA_TOP_K", "9");
    env::set_var("FORMQA_BACKEND", "hosted");

    let config = LayeredConfig::with_defaults()
        .load_from_file(file.path())
        .unwrap()
        .load_from_env();

    assert_eq!(config.top_k.value, 9);
    assert_eq!(config.top_k.source, ConfigSource::Environment);
    assert_eq!(config.backend.value, BackendKind::Hosted);

    clear_env();
}

#[test]
#[serial]
fn test_invalid_environment_value_is_ignored() {
    clear_env();
    env::set_var("FORMQA_TOP_K", "many");
    env::set_var("FORMQA_BACKEND", "faiss");

    let config = LayeredConfig::with_defaults().load_from_env();

    assert_eq!(config.top_k.value, 5);
    assert_eq!(config.top_k.source, ConfigSource::Default);
    assert_eq!(config.backend.value, BackendKind::Local);

    clear_env();
}

#[test]
#[serial]
fn test_cli_overrides_all() {
    clear_env();
    env::set_var("FORMQA_STORE_ID", "vs_env");

    let mut config = LayeredConfig::with_defaults().load_from_env();
    assert_eq!(config.store_id.source, ConfigSource::Environment);

    config.update_from_cli(CliConfigOverrides {
        store_id: Some("vs_cli".to_string()),
        top_k: Some(2),
        ..Default::default()
    });

    assert_eq!(config.store_id.value.as_deref(), Some("vs_cli"));
    assert_eq!(config.store_id.source, ConfigSource::Cli);
    assert_eq!(config.top_k.value, 2);

    clear_env();
}

#[test]
#[serial]
fn test_full_configuration_workflow() {
    clear_env();

    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(DEFAULT_CONFIG_FILE),
        r#"
backend = "hosted"

[hosted]
qa_url = "http://localhost:9000/api/v1/AzureAI"
upload_url = "http://localhost:9000/api/v1/AzureAI/upload"
"#,
    )
    .unwrap();

    env::set_var("FORMQA_API_KEY", "env-secret-value");
    env::set_var("FORMQA_STORE_ID", "vs_env");

    let config = LayeredConfig::with_defaults()
        .load_default_file(dir.path())
        .unwrap()
        .load_from_env();

    let settings = config.resolve().unwrap();
    let hosted = settings.hosted.expect("hosted settings");
    assert_eq!(hosted.api_key, "env-secret-value");
    assert_eq!(hosted.store_id, "vs_env");
    assert_eq!(hosted.upload_url.as_deref(), Some("http://localhost:9000/api/v1/AzureAI/upload"));
    assert!(settings.azure.is_none());

    let inspection = config.to_inspection_map();
    assert_eq!(inspection["hosted.api_key"].0, "***alue");
    assert_eq!(inspection["hosted.api_key"].1, ConfigSource::Environment);
    assert_eq!(inspection["backend"].1, ConfigSource::File);

    clear_env();
}

#[test]
#[serial]
fn test_local_backend_requires_azure() {
    clear_env();

    let err = LayeredConfig::with_defaults().load_from_env().resolve().unwrap_err();
    assert!(matches!(err, FormqaError::ConfigMissing { .. }));
}

#[test]
fn test_missing_default_file_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let config = LayeredConfig::with_defaults().load_default_file(dir.path()).unwrap();
    assert_eq!(config.backend.source, ConfigSource::Default);
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let result = LayeredConfig::with_defaults().load_from_file("/nonexistent/formqa.toml");
    assert!(result.is_err());
}
