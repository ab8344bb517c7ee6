use crate::error::{FormqaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "formqa.toml";

/// Configuration source for tracking where values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default value
    Default,
    /// Loaded from config file
    File,
    /// Loaded from environment variable
    Environment,
    /// Provided via CLI argument
    Cli,
}

impl ConfigSource {
    /// Returns the precedence level (higher = higher priority)
    pub fn precedence(&self) -> u8 {
        match self {
            ConfigSource::Default => 0,
            ConfigSource::File => 1,
            ConfigSource::Environment => 2,
            ConfigSource::Cli => 3,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConfigSource::Default => "default",
            ConfigSource::File => "file",
            ConfigSource::Environment => "env",
            ConfigSource::Cli => "cli",
        };
        f.write_str(name)
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }

    /// Update the value if the new source has higher precedence
    pub fn update(&mut self, value: T, source: ConfigSource) {
        if source.precedence() > self.source.precedence() {
            self.value = value;
            self.source = source;
        }
    }
}

impl<T> ConfigValue<Option<T>> {
    fn unset() -> Self {
        Self::new(None, ConfigSource::Default)
    }
}

/// Which retrieval backend answers questions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process embedding index + Azure OpenAI chat
    Local,
    /// Remote vector-store API that retrieves and answers in one call
    Hosted,
}

impl FromStr for BackendKind {
    type Err = FormqaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "local" => Ok(BackendKind::Local),
            "hosted" | "remote" => Ok(BackendKind::Hosted),
            _ => Err(FormqaError::ConfigInvalid {
                key: "backend".to_string(),
                reason: format!("Invalid backend: {}. Use local or hosted", s),
            }),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => f.write_str("local"),
            BackendKind::Hosted => f.write_str("hosted"),
        }
    }
}

/// Which embedder the local backend uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedderKind {
    /// Azure OpenAI embeddings deployment
    Azure,
    /// Offline feature-hashing embedder
    Hashing,
}

impl FromStr for EmbedderKind {
    type Err = FormqaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "azure" => Ok(EmbedderKind::Azure),
            "hashing" | "offline" => Ok(EmbedderKind::Hashing),
            _ => Err(FormqaError::ConfigInvalid {
                key: "embedder".to_string(),
                reason: format!("Invalid embedder: {}. Use azure or hashing", s),
            }),
        }
    }
}

impl fmt::Display for EmbedderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbedderKind::Azure => f.write_str("azure"),
            EmbedderKind::Hashing => f.write_str("hashing"),
        }
    }
}

/// Layered configuration for FormQA
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub backend: ConfigValue<BackendKind>,
    pub embedder: ConfigValue<EmbedderKind>,
    pub top_k: ConfigValue<usize>,
    pub timeout_secs: ConfigValue<u64>,

    pub azure_endpoint: ConfigValue<Option<String>>,
    pub azure_api_key: ConfigValue<Option<String>>,
    pub azure_api_version: ConfigValue<String>,
    pub azure_chat_deployment: ConfigValue<Option<String>>,
    pub azure_embedding_deployment: ConfigValue<Option<String>>,
    pub chat_temperature: ConfigValue<f32>,

    pub upload_url: ConfigValue<Option<String>>,
    pub qa_url: ConfigValue<Option<String>>,
    pub hosted_api_key: ConfigValue<Option<String>>,
    pub store_id: ConfigValue<Option<String>>,
    pub hosted_temperature: ConfigValue<f32>,
}

impl LayeredConfig {
    /// Create a new configuration with default values
    pub fn with_defaults() -> Self {
        Self {
            backend: ConfigValue::new(BackendKind::Local, ConfigSource::Default),
            embedder: ConfigValue::new(EmbedderKind::Azure, ConfigSource::Default),
            top_k: ConfigValue::new(5, ConfigSource::Default),
            timeout_secs: ConfigValue::new(120, ConfigSource::Default),
            azure_endpoint: ConfigValue::unset(),
            azure_api_key: ConfigValue::unset(),
            azure_api_version: ConfigValue::new("2024-02-01".to_string(), ConfigSource::Default),
            azure_chat_deployment: ConfigValue::unset(),
            azure_embedding_deployment: ConfigValue::unset(),
            chat_temperature: ConfigValue::new(0.2, ConfigSource::Default),
            upload_url: ConfigValue::unset(),
            qa_url: ConfigValue::unset(),
            hosted_api_key: ConfigValue::unset(),
            store_id: ConfigValue::unset(),
            hosted_temperature: ConfigValue::new(0.15, ConfigSource::Default),
        }
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let content =
            fs::read_to_string(path.as_ref()).map_err(|e| FormqaError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to read config file: {}", e),
            })?;

        let file_config: FileConfig =
            toml::from_str(&content).map_err(|e| FormqaError::ConfigInvalid {
                key: "file".to_string(),
                reason: format!("Failed to parse TOML: {}", e),
            })?;

        let src = ConfigSource::File;

        if let Some(backend) = file_config.backend {
            self.backend.update(backend, src);
        }
        if let Some(embedder) = file_config.embedder {
            self.embedder.update(embedder, src);
        }
        if let Some(top_k) = file_config.top_k {
            self.top_k.update(top_k, src);
        }
        if let Some(timeout) = file_config.timeout_secs {
            self.timeout_secs.update(timeout, src);
        }

        if let Some(azure) = file_config.azure {
            set_some(&mut self.azure_endpoint, azure.endpoint, src);
            set_some(&mut self.azure_api_key, azure.api_key, src);
            if let Some(version) = azure.api_version {
                self.azure_api_version.update(version, src);
            }
            set_some(&mut self.azure_chat_deployment, azure.chat_deployment, src);
            set_some(&mut self.azure_embedding_deployment, azure.embedding_deployment, src);
            if let Some(temperature) = azure.temperature {
                self.chat_temperature.update(temperature, src);
            }
        }

        if let Some(hosted) = file_config.hosted {
            set_some(&mut self.upload_url, hosted.upload_url, src);
            set_some(&mut self.qa_url, hosted.qa_url, src);
            set_some(&mut self.hosted_api_key, hosted.api_key, src);
            set_some(&mut self.store_id, hosted.store_id, src);
            if let Some(temperature) = hosted.temperature {
                self.hosted_temperature.update(temperature, src);
            }
        }

        Ok(self)
    }

    /// Load `formqa.toml` from a directory if one exists
    pub fn load_default_file<P: AsRef<Path>>(self, dir: P) -> Result<Self> {
        let path = dir.as_ref().join(DEFAULT_CONFIG_FILE);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "Loading config file");
            self.load_from_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        let src = ConfigSource::Environment;

        // FORMQA_BACKEND
        if let Ok(value) = env::var("FORMQA_BACKEND") {
            match value.parse() {
                Ok(backend) => self.backend.update(backend, src),
                Err(_) => tracing::warn!(
                    "Invalid FORMQA_BACKEND value '{}': expected local or hosted",
                    value
                ),
            }
        }

        // FORMQA_EMBEDDER
        if let Ok(value) = env::var("FORMQA_EMBEDDER") {
            match value.parse() {
                Ok(embedder) => self.embedder.update(embedder, src),
                Err(_) => tracing::warn!(
                    "Invalid FORMQA_EMBEDDER value '{}': expected azure or hashing",
                    value
                ),
            }
        }

        if let Some(top_k) = parse_env::<usize>("FORMQA_TOP_K") {
            self.top_k.update(top_k, src);
        }
        if let Some(timeout) = parse_env::<u64>("FORMQA_TIMEOUT_SECS") {
            self.timeout_secs.update(timeout, src);
        }

        set_some(&mut self.azure_endpoint, non_empty_env("AZURE_OPENAI_ENDPOINT"), src);
        set_some(&mut self.azure_api_key, non_empty_env("AZURE_OPENAI_API_KEY"), src);
        if let Some(version) = non_empty_env("AZURE_OPENAI_API_VERSION") {
            self.azure_api_version.update(version, src);
        }
        set_some(
            &mut self.azure_chat_deployment,
            non_empty_env("AZURE_OPENAI_DEPLOYMENT_NAME"),
            src,
        );
        set_some(
            &mut self.azure_embedding_deployment,
            non_empty_env("AZURE_OPENAI_EMBEDDING_DEPLOYMENT_NAME"),
            src,
        );
        if let Some(temperature) = parse_env::<f32>("FORMQA_CHAT_TEMPERATURE") {
            self.chat_temperature.update(temperature, src);
        }

        set_some(&mut self.upload_url, non_empty_env("FORMQA_UPLOAD_URL"), src);
        set_some(&mut self.qa_url, non_empty_env("FORMQA_QA_URL"), src);
        set_some(&mut self.hosted_api_key, non_empty_env("FORMQA_API_KEY"), src);
        set_some(&mut self.store_id, non_empty_env("FORMQA_STORE_ID"), src);
        if let Some(temperature) = parse_env::<f32>("FORMQA_HOSTED_TEMPERATURE") {
            self.hosted_temperature.update(temperature, src);
        }

        self
    }

    /// Update configuration from CLI arguments
    pub fn update_from_cli(&mut self, overrides: CliConfigOverrides) {
        let src = ConfigSource::Cli;

        if let Some(backend) = overrides.backend {
            self.backend.update(backend, src);
        }
        if let Some(embedder) = overrides.embedder {
            self.embedder.update(embedder, src);
        }
        if let Some(top_k) = overrides.top_k {
            self.top_k.update(top_k, src);
        }
        set_some(&mut self.store_id, overrides.store_id, src);
    }

    /// Validate and freeze the configuration for the selected backend
    pub fn resolve(&self) -> Result<Settings> {
        if self.top_k.value == 0 {
            return Err(FormqaError::ConfigInvalid {
                key: "top_k".to_string(),
                reason: "top_k must be at least 1".to_string(),
            });
        }
        if self.timeout_secs.value == 0 {
            return Err(FormqaError::ConfigInvalid {
                key: "timeout_secs".to_string(),
                reason: "timeout_secs must be at least 1".to_string(),
            });
        }

        let backend = self.backend.value;
        let embedder = self.embedder.value;

        let azure = match backend {
            BackendKind::Local => Some(AzureSettings {
                endpoint: required(&self.azure_endpoint, "azure.endpoint (AZURE_OPENAI_ENDPOINT)")?,
                api_key: required(&self.azure_api_key, "azure.api_key (AZURE_OPENAI_API_KEY)")?,
                api_version: self.azure_api_version.value.clone(),
                chat_deployment: required(
                    &self.azure_chat_deployment,
                    "azure.chat_deployment (AZURE_OPENAI_DEPLOYMENT_NAME)",
                )?,
                embedding_deployment: match embedder {
                    EmbedderKind::Azure => Some(required(
                        &self.azure_embedding_deployment,
                        "azure.embedding_deployment (AZURE_OPENAI_EMBEDDING_DEPLOYMENT_NAME)",
                    )?),
                    EmbedderKind::Hashing => self.azure_embedding_deployment.value.clone(),
                },
                temperature: self.chat_temperature.value,
            }),
            BackendKind::Hosted => None,
        };

        let hosted = match backend {
            BackendKind::Hosted => Some(HostedSettings {
                upload_url: self.upload_url.value.clone(),
                qa_url: required(&self.qa_url, "hosted.qa_url (FORMQA_QA_URL)")?,
                api_key: required(&self.hosted_api_key, "hosted.api_key (FORMQA_API_KEY)")?,
                store_id: required(&self.store_id, "hosted.store_id (FORMQA_STORE_ID)")?,
                temperature: self.hosted_temperature.value,
            }),
            BackendKind::Local => None,
        };

        Ok(Settings {
            backend,
            embedder,
            top_k: self.top_k.value,
            timeout: Duration::from_secs(self.timeout_secs.value),
            azure,
            hosted,
        })
    }

    /// Get all configuration values as a map for inspection; secrets are masked
    pub fn to_inspection_map(&self) -> BTreeMap<String, (String, ConfigSource)> {
        let mut map = BTreeMap::new();

        let mut insert = |key: &str, value: String, source: ConfigSource| {
            map.insert(key.to_string(), (value, source));
        };

        insert("backend", self.backend.value.to_string(), self.backend.source);
        insert("embedder", self.embedder.value.to_string(), self.embedder.source);
        insert("top_k", self.top_k.value.to_string(), self.top_k.source);
        insert("timeout_secs", self.timeout_secs.value.to_string(), self.timeout_secs.source);

        insert("azure.endpoint", show(&self.azure_endpoint.value), self.azure_endpoint.source);
        insert("azure.api_key", mask(&self.azure_api_key.value), self.azure_api_key.source);
        insert(
            "azure.api_version",
            self.azure_api_version.value.clone(),
            self.azure_api_version.source,
        );
        insert(
            "azure.chat_deployment",
            show(&self.azure_chat_deployment.value),
            self.azure_chat_deployment.source,
        );
        insert(
            "azure.embedding_deployment",
            show(&self.azure_embedding_deployment.value),
            self.azure_embedding_deployment.source,
        );
        insert(
            "azure.temperature",
            self.chat_temperature.value.to_string(),
            self.chat_temperature.source,
        );

        insert("hosted.upload_url", show(&self.upload_url.value), self.upload_url.source);
        insert("hosted.qa_url", show(&self.qa_url.value), self.qa_url.source);
        insert("hosted.api_key", mask(&self.hosted_api_key.value), self.hosted_api_key.source);
        insert("hosted.store_id", show(&self.store_id.value), self.store_id.source);
        insert(
            "hosted.temperature",
            self.hosted_temperature.value.to_string(),
            self.hosted_temperature.source,
        );

        map
    }
}

/// Frozen, validated configuration handed to components at construction
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend: BackendKind,
    pub embedder: EmbedderKind,
    pub top_k: usize,
    pub timeout: Duration,
    /// Present for the local backend
    pub azure: Option<AzureSettings>,
    /// Present for the hosted backend
    pub hosted: Option<HostedSettings>,
}

/// Azure OpenAI connection settings
#[derive(Clone)]
pub struct AzureSettings {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub chat_deployment: String,
    pub embedding_deployment: Option<String>,
    pub temperature: f32,
}

impl fmt::Debug for AzureSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"***")
            .field("api_version", &self.api_version)
            .field("chat_deployment", &self.chat_deployment)
            .field("embedding_deployment", &self.embedding_deployment)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Hosted vector-store API settings
#[derive(Clone)]
pub struct HostedSettings {
    pub upload_url: Option<String>,
    pub qa_url: String,
    pub api_key: String,
    pub store_id: String,
    pub temperature: f32,
}

impl fmt::Debug for HostedSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostedSettings")
            .field("upload_url", &self.upload_url)
            .field("qa_url", &self.qa_url)
            .field("api_key", &"***")
            .field("store_id", &self.store_id)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Configuration loaded from TOML file
#[derive(Debug, Default, Deserialize, Serialize)]
struct FileConfig {
    backend: Option<BackendKind>,
    embedder: Option<EmbedderKind>,
    top_k: Option<usize>,
    timeout_secs: Option<u64>,
    azure: Option<AzureFileConfig>,
    hosted: Option<HostedFileConfig>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct AzureFileConfig {
    endpoint: Option<String>,
    api_key: Option<String>,
    api_version: Option<String>,
    chat_deployment: Option<String>,
    embedding_deployment: Option<String>,
    temperature: Option<f32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct HostedFileConfig {
    upload_url: Option<String>,
    qa_url: Option<String>,
    api_key: Option<String>,
    store_id: Option<String>,
    temperature: Option<f32>,
}

/// CLI configuration overrides
#[derive(Debug, Default)]
pub struct CliConfigOverrides {
    pub backend: Option<BackendKind>,
    pub embedder: Option<EmbedderKind>,
    pub top_k: Option<usize>,
    pub store_id: Option<String>,
}

fn set_some(target: &mut ConfigValue<Option<String>>, value: Option<String>, source: ConfigSource) {
    if let Some(value) = value {
        target.update(Some(value), source);
    }
}

fn required(value: &ConfigValue<Option<String>>, key: &str) -> Result<String> {
    value
        .value
        .clone()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| FormqaError::ConfigMissing { key: key.to_string() })
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T: FromStr>(key: &str) -> Option<T> {
    let raw = non_empty_env(key)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid {} value '{}': ignoring", key, raw);
            None
        }
    }
}

fn show(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "(unset)".to_string())
}

fn mask(value: &Option<String>) -> String {
    match value {
        Some(v) if v.len() > 4 => format!("***{}", &v[v.len() - 4..]),
        Some(_) => "***".to_string(),
        None => "(unset)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn local_config() -> LayeredConfig {
        let mut config = LayeredConfig::with_defaults();
        config
            .azure_endpoint
            .update(Some("https://example.openai.azure.com".into()), ConfigSource::File);
        config.azure_api_key.update(Some("secret-key".into()), ConfigSource::File);
        config.azure_chat_deployment.update(Some("gpt-4o".into()), ConfigSource::File);
        config.azure_embedding_deployment.update(Some("text-embedding".into()), ConfigSource::File);
        config
    }

    #[test]
    fn test_default_config() {
        let config = LayeredConfig::with_defaults();
        assert_eq!(config.backend.value, BackendKind::Local);
        assert_eq!(config.backend.source, ConfigSource::Default);
        assert_eq!(config.top_k.value, 5);
        assert_eq!(config.hosted_temperature.value, 0.15);
        assert_eq!(config.chat_temperature.value, 0.2);
    }

    #[test]
    fn test_config_precedence() {
        let mut value = ConfigValue::new(100, ConfigSource::Default);

        value.update(200, ConfigSource::File);
        assert_eq!(value.value, 200);

        value.update(300, ConfigSource::Environment);
        assert_eq!(value.value, 300);

        value.update(400, ConfigSource::Cli);
        assert_eq!(value.value, 400);
        assert_eq!(value.source, ConfigSource::Cli);

        // Lower precedence should not override
        value.update(500, ConfigSource::File);
        assert_eq!(value.value, 400);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
backend = "hosted"
top_k = 8

[hosted]
qa_url = "http://qa.example/v1/AzureAI"
api_key = "k"
store_id = "vs_123"
"#
        )
        .unwrap();

        let config = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap();

        assert_eq!(config.backend.value, BackendKind::Hosted);
        assert_eq!(config.backend.source, ConfigSource::File);
        assert_eq!(config.top_k.value, 8);
        assert_eq!(config.store_id.value.as_deref(), Some("vs_123"));
        assert_eq!(config.upload_url.value, None);
    }

    #[test]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "backend = [").unwrap();

        let err = LayeredConfig::with_defaults().load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, FormqaError::ConfigInvalid { .. }));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = LayeredConfig::with_defaults();
        config.update_from_cli(CliConfigOverrides {
            backend: Some(BackendKind::Hosted),
            store_id: Some("vs_cli".into()),
            ..Default::default()
        });

        assert_eq!(config.backend.value, BackendKind::Hosted);
        assert_eq!(config.backend.source, ConfigSource::Cli);
        assert_eq!(config.store_id.value.as_deref(), Some("vs_cli"));
        assert_eq!(config.top_k.source, ConfigSource::Default);
    }

    #[test]
    fn test_resolve_local() {
        let settings = local_config().resolve().unwrap();
        assert_eq!(settings.backend, BackendKind::Local);
        assert!(settings.hosted.is_none());

        let azure = settings.azure.unwrap();
        assert_eq!(azure.chat_deployment, "gpt-4o");
        assert_eq!(azure.embedding_deployment.as_deref(), Some("text-embedding"));
        assert_eq!(settings.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_resolve_local_missing_key() {
        let mut config = local_config();
        config.azure_api_key = ConfigValue::unset();

        let err = config.resolve().unwrap_err();
        match err {
            FormqaError::ConfigMissing { key } => assert!(key.contains("AZURE_OPENAI_API_KEY")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_hashing_embedder_needs_no_embedding_deployment() {
        let mut config = local_config();
        config.azure_embedding_deployment = ConfigValue::unset();
        assert!(config.resolve().is_err());

        config.embedder.update(EmbedderKind::Hashing, ConfigSource::Cli);
        assert!(config.resolve().is_ok());
    }

    #[test]
    fn test_resolve_hosted_requires_store() {
        let mut config = LayeredConfig::with_defaults();
        config.backend.update(BackendKind::Hosted, ConfigSource::Cli);
        config.qa_url.update(Some("http://qa".into()), ConfigSource::File);
        config.hosted_api_key.update(Some("k".into()), ConfigSource::File);

        assert!(matches!(config.resolve(), Err(FormqaError::ConfigMissing { .. })));

        config.store_id.update(Some("vs_1".into()), ConfigSource::File);
        let hosted = config.resolve().unwrap().hosted.unwrap();
        assert_eq!(hosted.store_id, "vs_1");
        assert_eq!(hosted.temperature, 0.15);
    }

    #[test]
    fn test_zero_top_k_rejected() {
        let mut config = local_config();
        config.top_k.update(0, ConfigSource::Cli);
        assert!(config.resolve().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = local_config();
        config.timeout_secs.update(0, ConfigSource::Environment);
        match config.resolve() {
            Err(FormqaError::ConfigInvalid { key, .. }) => assert_eq!(key, "timeout_secs"),
            other => panic!("expected ConfigInvalid, got {:?}", other.map(|s| s.timeout)),
        }

        config.timeout_secs.update(1, ConfigSource::Cli);
        assert!(config.resolve().is_ok());
    }

    #[test]
    fn test_inspection_map_masks_secrets() {
        let map = local_config().to_inspection_map();

        let (key, source) = &map["azure.api_key"];
        assert_eq!(key, "***-key");
        assert_eq!(*source, ConfigSource::File);

        let (store, _) = &map["hosted.store_id"];
        assert_eq!(store, "(unset)");
    }

    #[test]
    fn test_parse_kinds() {
        assert_eq!("HOSTED".parse::<BackendKind>().unwrap(), BackendKind::Hosted);
        assert_eq!("hashing".parse::<EmbedderKind>().unwrap(), EmbedderKind::Hashing);
        assert!("faiss".parse::<BackendKind>().is_err());
    }
}
