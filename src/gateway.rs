//! AI gateway
//!
//! Two operations sit on top of the [`Provider`]: free-text assistant chat,
//! which always produces a displayable string, and food photo analysis,
//! which returns structured estimates. Analysis keeps "nothing identified"
//! (an empty list) separate from "the request failed" (an error).

use crate::config::ProviderConfig;
use crate::error::{FitbotError, Result};
use crate::providers::{self, GenerateRequest, Part, Provider};
use crate::telemetry::AiRequestMetrics;
use crate::tracker::FoodEstimate;
use serde_json::json;
use std::sync::Arc;

/// Persona given to the text model on every chat request
pub const SYSTEM_INSTRUCTION: &str = "You are FitBot AI, a knowledgeable and encouraging fitness and nutrition assistant. \
Your goal is to provide safe, helpful, and motivational guidance to users. \
Do not provide medical advice. Keep your responses concise and easy to understand. \
Encourage users on their fitness journey.";

/// Chat reply when no API key is available
pub const MISSING_KEY_REPLY: &str =
    "Error: API Key is not configured. Please check your environment variables.";

/// Chat reply when the request fails
pub const CONNECTION_ERROR_REPLY: &str =
    "Sorry, I'm having trouble connecting to my brain right now. Please try again later.";

/// Scan message when no API key is available
pub const API_KEY_NOT_CONFIGURED: &str = "API Key is not configured.";

/// Scan message for any request, remote or parse failure
pub const FOOD_ANALYSIS_FAILED: &str =
    "Failed to analyze image. The AI may be busy. Please try again.";

/// Instruction sent alongside the food photo
pub const FOOD_ANALYSIS_PROMPT: &str = "Analyze the food items in this image. Identify each distinct item and estimate its calories. \
Return the result as a JSON array of objects, where each object has a \"name\" (string) and \"calories\" (number). \
For example: [{\"name\": \"Scrambled Eggs\", \"calories\": 150}, {\"name\": \"Toast\", \"calories\": 80}]. \
If no food is identifiable, return an empty array.";

/// Response schema for food analysis: an array of `{name, calories}`
pub fn food_response_schema() -> serde_json::Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "name": {"type": "STRING"},
                "calories": {"type": "NUMBER"}
            },
            "required": ["name", "calories"]
        }
    })
}

/// Front door to the generative AI service
#[derive(Clone)]
pub struct AiGateway {
    provider: Option<Arc<dyn Provider>>,
}

impl std::fmt::Debug for AiGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiGateway")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .finish()
    }
}

impl AiGateway {
    /// Gateway over `provider`; `None` means no API key is configured
    pub fn new(provider: Option<Arc<dyn Provider>>) -> Self {
        Self { provider }
    }

    /// Build the gateway from configuration
    ///
    /// A missing key is logged once here; every later call answers with the
    /// missing-key message instead of failing.
    pub fn from_config(config: &ProviderConfig) -> Self {
        match providers::create_provider(config) {
            Ok(provider) => Self::new(Some(Arc::from(provider))),
            Err(e) => {
                match e.downcast_ref::<FitbotError>() {
                    Some(FitbotError::MissingCredentials(_)) => tracing::error!(
                        "Gemini API key not found. Set GEMINI_API_KEY or run `fitbot auth`."
                    ),
                    _ => tracing::error!("Failed to initialize AI provider: {}", e),
                }
                Self::new(None)
            }
        }
    }

    /// Whether an API key is available
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Ask the assistant; always returns displayable text
    pub async fn assistant_response(&self, prompt: &str) -> String {
        let metrics = AiRequestMetrics::new("chat");
        let Some(provider) = &self.provider else {
            metrics.record_error("missing_credentials");
            return MISSING_KEY_REPLY.to_string();
        };

        let request = GenerateRequest::new(vec![Part::text(prompt)])
            .with_system_instruction(SYSTEM_INSTRUCTION);

        match provider.generate(request).await {
            Ok(text) => {
                metrics.record_success();
                text
            }
            Err(e) => {
                tracing::error!("Error calling {} API: {}", provider.name(), e);
                metrics.record_error("transport");
                CONNECTION_ERROR_REPLY.to_string()
            }
        }
    }

    /// Identify food in a JPEG photo and estimate calories
    ///
    /// # Errors
    ///
    /// Returns `FitbotError::MissingCredentials` without an API key and
    /// `FitbotError::FoodAnalysis` for request, remote or parse failures.
    /// A reply that identifies nothing is `Ok(vec![])`.
    pub async fn analyze_food_image(&self, jpeg: &[u8]) -> Result<Vec<FoodEstimate>> {
        let metrics = AiRequestMetrics::new("vision");
        let Some(provider) = &self.provider else {
            metrics.record_error("missing_credentials");
            return Err(FitbotError::MissingCredentials(API_KEY_NOT_CONFIGURED.to_string()).into());
        };

        let request = GenerateRequest::new(vec![
            Part::jpeg(jpeg.to_vec()),
            Part::text(FOOD_ANALYSIS_PROMPT),
        ])
        .with_json_schema(food_response_schema());

        let text = provider.generate(request).await.map_err(|e| {
            tracing::error!("Error analyzing food image with {} API: {}", provider.name(), e);
            metrics.record_error("transport");
            FitbotError::FoodAnalysis(FOOD_ANALYSIS_FAILED.to_string())
        })?;

        let estimates = parse_food_estimates(&text).map_err(|e| {
            tracing::error!("Failed to parse food analysis reply: {}", e);
            metrics.record_error("parse");
            FitbotError::FoodAnalysis(FOOD_ANALYSIS_FAILED.to_string())
        })?;

        tracing::info!(items = estimates.len(), "Food image analyzed");
        metrics.record_items(estimates.len());
        Ok(estimates)
    }
}

/// Parse the model's JSON reply
///
/// A JSON array becomes the estimate list (possibly empty); any other JSON
/// value means nothing was identified.
fn parse_food_estimates(text: &str) -> Result<Vec<FoodEstimate>> {
    let value: serde_json::Value = serde_json::from_str(text.trim())?;
    if !value.is_array() {
        tracing::warn!("Food analysis reply was not an array, treating as empty");
        return Ok(Vec::new());
    }
    Ok(serde_json::from_value(value)?)
}

/// Text to show the user for a failed analysis
pub fn scan_error_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<FitbotError>() {
        Some(FitbotError::MissingCredentials(_)) => API_KEY_NOT_CONFIGURED.to_string(),
        Some(FitbotError::FoodAnalysis(message)) => message.clone(),
        _ => FOOD_ANALYSIS_FAILED.to_string(),
    }
}
