use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::{parse_vision_provider_model, VisionConfig};
use crate::error::{PillboxError, Result};
use crate::models::TextAnnotation;

use super::api::{GoogleVisionClient, OpenAiVisionClient};
use super::TextDetector;

#[derive(Clone)]
enum VisionApiClient {
    Google(GoogleVisionClient),
    OpenAi(OpenAiVisionClient),
}

impl VisionApiClient {
    async fn detect_text(&self, image_bytes: &[u8]) -> Result<Vec<TextAnnotation>> {
        match self {
            VisionApiClient::Google(c) => c.detect_text(image_bytes).await,
            VisionApiClient::OpenAi(c) => c.detect_text(image_bytes).await,
        }
    }
}

#[derive(Clone)]
enum VisionBackend {
    Api { client: VisionApiClient },
    Unavailable { reason: String },
}

#[derive(Clone)]
pub struct VisionProvider {
    backend: VisionBackend,
}

impl VisionProvider {
    pub fn new(config: &VisionConfig) -> Self {
        let (provider, _) = parse_vision_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "google" => match GoogleVisionClient::new(config) {
                Ok(client) => {
                    info!(model = %config.model, "Google Cloud Vision backend initialized");
                    VisionBackend::Api {
                        client: VisionApiClient::Google(client),
                    }
                }
                Err(e) => unavailable(format!("Google Cloud Vision backend unavailable: {e}")),
            },
            "openai" => match OpenAiVisionClient::new(config) {
                Ok(client) => {
                    info!(model = %config.model, "OpenAI vision backend initialized");
                    VisionBackend::Api {
                        client: VisionApiClient::OpenAi(client),
                    }
                }
                Err(e) => unavailable(format!("OpenAI vision backend unavailable: {e}")),
            },
            _ => unavailable(format!("Unknown vision model '{}'", config.model)),
        };

        Self { backend }
    }
}

fn unavailable(reason: String) -> VisionBackend {
    warn!("{}", reason);
    VisionBackend::Unavailable { reason }
}

#[async_trait]
impl TextDetector for VisionProvider {
    async fn detect_text(&self, image_bytes: &[u8]) -> Result<Vec<TextAnnotation>> {
        match &self.backend {
            VisionBackend::Api { client } => client.detect_text(image_bytes).await,
            VisionBackend::Unavailable { reason } => {
                Err(PillboxError::VisionUnavailable(reason.clone()))
            }
        }
    }

    fn is_available(&self) -> bool {
        !matches!(self.backend, VisionBackend::Unavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(model: &str, api_key: Option<&str>) -> VisionConfig {
        VisionConfig {
            model: model.to_string(),
            api_key: api_key.map(String::from),
            ..VisionConfig::default()
        }
    }

    #[test]
    fn test_google_model_without_api_key_is_unavailable() {
        let provider = VisionProvider::new(&make_config("google/text-detection", None));
        assert!(!provider.is_available());
    }

    #[test]
    fn test_openai_model_without_api_key_is_unavailable() {
        let provider = VisionProvider::new(&make_config("openai/gpt-4o", None));
        assert!(!provider.is_available());
    }

    #[test]
    fn test_configured_models_are_available() {
        assert!(VisionProvider::new(&make_config("google/text-detection", Some("k"))).is_available());
        assert!(VisionProvider::new(&make_config("OpenAI/gpt-4o", Some("k"))).is_available());
    }

    #[test]
    fn test_unknown_prefix_is_unavailable() {
        let provider = VisionProvider::new(&make_config("tesseract", Some("k")));
        assert!(!provider.is_available());
    }

    #[tokio::test]
    async fn test_unavailable_returns_error() {
        let provider = VisionProvider::new(&make_config("google/text-detection", None));
        let result = provider.detect_text(&[]).await;
        assert!(matches!(result, Err(PillboxError::VisionUnavailable(_))));
    }

    #[test]
    fn test_provider_clone_keeps_backend() {
        let provider = VisionProvider::new(&make_config("openai/gpt-4o", Some("k")));
        let cloned = provider.clone();
        assert_eq!(provider.is_available(), cloned.is_available());
    }
}
