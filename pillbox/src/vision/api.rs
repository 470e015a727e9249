use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{parse_vision_provider_model, VisionConfig};
use crate::error::{PillboxError, Result};
use crate::models::TextAnnotation;

const GOOGLE_VISION_BASE_URL: &str = "https://vision.googleapis.com/v1";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

const TRANSCRIBE_PROMPT: &str = "Transcribe every piece of text printed or engraved on the pill in this photo. \
Return the tokens exactly as printed, separated by whitespace, without explanations or formatting.";

fn build_http_client(config: &VisionConfig) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| PillboxError::VisionService(format!("Failed to create HTTP client: {e}")))
}

async fn read_error_body(resp: reqwest::Response) -> PillboxError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    PillboxError::VisionService(format!("API request failed: {status} - {body}"))
}

#[derive(Clone, Debug)]
pub struct GoogleVisionClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
struct AnnotateImageRequest {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
struct AnnotateImageResponse {
    #[serde(default, rename = "textAnnotations")]
    text_annotations: Vec<TextAnnotation>,
    error: Option<AnnotateStatus>,
}

#[derive(Debug, Deserialize)]
struct AnnotateStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

impl GoogleVisionClient {
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            PillboxError::VisionService("API key required for Google Cloud Vision".to_string())
        })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| GOOGLE_VISION_BASE_URL.to_string());

        Ok(Self {
            client: build_http_client(config)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn detect_text(&self, image_bytes: &[u8]) -> Result<Vec<TextAnnotation>> {
        let request = AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: ImageContent {
                    content: STANDARD.encode(image_bytes),
                },
                features: vec![Feature {
                    feature_type: "TEXT_DETECTION",
                }],
            }],
        };

        let resp = self
            .client
            .post(format!("{}/images:annotate", self.base_url))
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| PillboxError::VisionService(format!("API request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(read_error_body(resp).await);
        }

        let body: AnnotateResponse = resp
            .json()
            .await
            .map_err(|e| PillboxError::VisionService(format!("Failed to parse response: {e}")))?;

        let Some(first) = body.responses.into_iter().next() else {
            return Ok(Vec::new());
        };

        if let Some(status) = first.error {
            return Err(PillboxError::VisionService(format!(
                "Text detection failed ({}): {}",
                status.code, status.message
            )));
        }

        Ok(first.text_annotations)
    }
}

#[derive(Clone, Debug)]
pub struct OpenAiVisionClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiVisionClient {
    pub fn new(config: &VisionConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            PillboxError::VisionService("API key required for OpenAI Vision".to_string())
        })?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| OPENAI_BASE_URL.to_string());

        let (_, model) = parse_vision_provider_model(&config.model);

        Ok(Self {
            client: build_http_client(config)?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub async fn detect_text(&self, image_bytes: &[u8]) -> Result<Vec<TextAnnotation>> {
        let mime = infer::get(image_bytes)
            .map(|kind| kind.mime_type())
            .unwrap_or("image/png");
        let data_url = format!("data:{mime};base64,{}", STANDARD.encode(image_bytes));

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: TRANSCRIBE_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            max_tokens: 512,
        };

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| PillboxError::VisionService(format!("API request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(read_error_body(resp).await);
        }

        let chat_response: ChatResponse = resp
            .json()
            .await
            .map_err(|e| PillboxError::VisionService(format!("Failed to parse response: {e}")))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PillboxError::VisionService("No response from API".to_string()))?
            .message
            .content
            .unwrap_or_default();

        Ok(annotations_from_transcript(&content))
    }
}

/// Shapes a free-text transcript like a TEXT_DETECTION result: the whole
/// transcript first, then one annotation per whitespace-separated token.
fn annotations_from_transcript(transcript: &str) -> Vec<TextAnnotation> {
    let transcript = transcript.trim();
    if transcript.is_empty() {
        return Vec::new();
    }

    std::iter::once(TextAnnotation::new(transcript))
        .chain(transcript.split_whitespace().map(TextAnnotation::new))
        .collect()
}
