//! Google Gemini provider
//!
//! Talks to the `generateContent` REST endpoint. Text-only requests go to the
//! configured text model, requests carrying images go to the vision model.

use crate::config::GeminiConfig;
use crate::error::{FitbotError, Result};
use crate::providers::{GenerateRequest, Part, Provider};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini provider implementation
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    config: GeminiConfig,
    api_key: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_base", &self.config.api_base)
            .field("text_model", &self.config.text_model)
            .field("vision_model", &self.config.vision_model)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

impl From<Part> for GeminiPart {
    fn from(part: Part) -> Self {
        match part {
            Part::Text(text) => GeminiPart {
                text: Some(text),
                inline_data: None,
            },
            Part::InlineData { mime_type, data } => GeminiPart {
                text: None,
                inline_data: Some(GeminiInlineData {
                    mime_type,
                    data: BASE64.encode(data),
                }),
            },
        }
    }
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    ///
    /// # Examples
    ///
    /// ```
    /// use fitbot::config::GeminiConfig;
    /// use fitbot::providers::GeminiProvider;
    ///
    /// let provider = GeminiProvider::new(GeminiConfig::default(), "key".to_string()).unwrap();
    /// assert_eq!(provider.text_model(), "gemini-2.5-flash");
    /// ```
    pub fn new(config: GeminiConfig, api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("fitbot/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FitbotError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini provider: api_base={}, text_model={}, vision_model={}",
            config.api_base,
            config.text_model,
            config.vision_model
        );

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn text_model(&self) -> &str {
        &self.config.text_model
    }

    pub fn vision_model(&self) -> &str {
        &self.config.vision_model
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            model
        )
    }

    fn build_request(request: GenerateRequest) -> GeminiRequest {
        let generation_config =
            if request.response_mime_type.is_some() || request.response_schema.is_some() {
                Some(GenerationConfig {
                    response_mime_type: request.response_mime_type,
                    response_schema: request.response_schema,
                })
            } else {
                None
            };

        GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: request.parts.into_iter().map(GeminiPart::from).collect(),
            }],
            system_instruction: request.system_instruction.map(|text| GeminiContent {
                role: None,
                parts: vec![GeminiPart::from(Part::Text(text))],
            }),
            generation_config,
        }
    }

    fn extract_text(response: GeminiResponse) -> Result<String> {
        let content = response
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .ok_or_else(|| FitbotError::Provider("Gemini returned no candidates".to_string()))?;

        let text: String = content
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();

        if text.is_empty() {
            return Err(FitbotError::Provider("Gemini returned an empty reply".to_string()).into());
        }
        Ok(text)
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let model = if request.has_inline_data() {
            self.config.vision_model.clone()
        } else {
            self.config.text_model.clone()
        };
        let url = self.endpoint(&model);
        let body = Self::build_request(request);

        tracing::debug!(
            model = %model,
            parts = body.contents[0].parts.len(),
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                FitbotError::Provider(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(FitbotError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            FitbotError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        Self::extract_text(gemini_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = GeminiConfig {
            api_base: "http://localhost:9000/".to_string(),
            ..Default::default()
        };
        let provider = GeminiProvider::new(config, "k".to_string()).unwrap();
        assert_eq!(
            provider.endpoint("gemini-2.5-flash"),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_build_request_wire_shape() {
        let request = GenerateRequest::new(vec![Part::jpeg(b"abc".to_vec()), Part::text("Analyze")])
            .with_system_instruction("Be helpful")
            .with_json_schema(json!({"type": "ARRAY"}));

        let value = serde_json::to_value(GeminiProvider::build_request(request)).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"inlineData": {"mimeType": "image/jpeg", "data": "YWJj"}},
                        {"text": "Analyze"}
                    ]
                }],
                "systemInstruction": {"parts": [{"text": "Be helpful"}]},
                "generationConfig": {
                    "responseMimeType": "application/json",
                    "responseSchema": {"type": "ARRAY"}
                }
            })
        );
    }

    #[test]
    fn test_build_request_omits_empty_generation_config() {
        let value =
            serde_json::to_value(GeminiProvider::build_request(GenerateRequest::new(vec![
                Part::text("hi"),
            ])))
            .unwrap();
        assert!(value.get("generationConfig").is_none());
        assert!(value.get("systemInstruction").is_none());
    }

    #[test]
    fn test_extract_text_concatenates_parts() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]}}]
        }))
        .unwrap();
        assert_eq!(GeminiProvider::extract_text(response).unwrap(), "Hello there");
    }

    #[test]
    fn test_extract_text_without_candidates_fails() {
        let response: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        let err = GeminiProvider::extract_text(response).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FitbotError>(),
            Some(FitbotError::Provider(_))
        ));
    }
}
