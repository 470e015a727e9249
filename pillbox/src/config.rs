use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub vision: VisionConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    pub local_path: Option<String>,
    /// Seconds between pulls from the primary when running as an embedded
    /// replica.
    pub sync_interval_secs: u64,
}

/// Text-detection provider settings.
///
/// `model` selects the backend by prefix: `google/...` for Cloud Vision
/// TEXT_DETECTION, `openai/<model>` for an OpenAI-compatible vision chat model.
#[derive(Debug, Clone, Deserialize)]
pub struct VisionConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub preprocess: bool,
    pub max_image_dimension: u32,
    pub min_image_dimension: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub max_limit: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            model: "google/text-detection".to_string(),
            api_key: None,
            base_url: None,
            timeout_secs: 30,
            max_upload_bytes: 10 * 1024 * 1024,
            preprocess: true,
            max_image_dimension: 2048,
            min_image_dimension: 32,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let vision_defaults = VisionConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("PILLBOX_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PILLBOX_PORT", 3000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:pillbox.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
                sync_interval_secs: parse_env_or("DATABASE_SYNC_INTERVAL", 60),
            },
            vision: VisionConfig {
                model: env::var("VISION_MODEL").unwrap_or(vision_defaults.model),
                api_key: env::var("VISION_API_KEY").ok(),
                base_url: env::var("VISION_BASE_URL").ok(),
                timeout_secs: parse_env_or("VISION_TIMEOUT", vision_defaults.timeout_secs),
                max_upload_bytes: parse_env_or(
                    "VISION_MAX_UPLOAD_BYTES",
                    vision_defaults.max_upload_bytes,
                ),
                preprocess: parse_env_or("VISION_PREPROCESS", vision_defaults.preprocess),
                max_image_dimension: parse_env_or(
                    "VISION_MAX_DIMENSION",
                    vision_defaults.max_image_dimension,
                ),
                min_image_dimension: parse_env_or(
                    "VISION_MIN_DIMENSION",
                    vision_defaults.min_image_dimension,
                ),
            },
            search: SearchConfig {
                max_limit: parse_env_or("SEARCH_MAX_LIMIT", 100),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known text-detection providers.
pub const KNOWN_VISION_PROVIDERS: &[&str] = &["google", "openai"];

/// Split a vision model name into (provider, model).
///
/// Unknown prefixes fall through as `("unknown", model)` so the provider can
/// report itself unavailable instead of guessing.
pub fn parse_vision_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_VISION_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("unknown", model)
}
