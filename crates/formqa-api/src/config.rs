use std::env;
use std::path::PathBuf;

/// API server configuration loaded from environment variables
///
/// Backend credentials are not read here; they come from the shared
/// layered configuration (`formqa.toml` and `FORMQA_*` / `AZURE_OPENAI_*`).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    pub config_path: Option<PathBuf>,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            cors_origin: "http://localhost:3000".to_string(),
            config_path: None,
            max_upload_bytes: 20 * 1024 * 1024,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("FORMQA_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let cors_origin = env::var("FORMQA_CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        let config_path = env::var("FORMQA_CONFIG").ok().map(PathBuf::from);

        let max_upload_bytes = env::var("FORMQA_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|b| b.parse().ok())
            .unwrap_or(defaults.max_upload_bytes);

        Self { port, cors_origin, config_path, max_upload_bytes }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
