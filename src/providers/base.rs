//! Base provider trait and request types
//!
//! A provider turns a [`GenerateRequest`] (optional system instruction,
//! ordered content parts, optional structured-output constraints) into the
//! text of the model's reply.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One piece of request content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    /// Plain text
    Text(String),
    /// Binary data with its MIME type (sent base64-encoded)
    InlineData { mime_type: String, data: Vec<u8> },
}

impl Part {
    /// Text part
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text(text.into())
    }

    /// JPEG image part
    pub fn jpeg(data: Vec<u8>) -> Self {
        Part::InlineData {
            mime_type: "image/jpeg".to_string(),
            data,
        }
    }

    /// Whether this part carries binary data
    pub fn is_inline_data(&self) -> bool {
        matches!(self, Part::InlineData { .. })
    }
}

/// A single-turn generation request
///
/// # Examples
///
/// ```
/// use fitbot::providers::{GenerateRequest, Part};
///
/// let request = GenerateRequest::new(vec![Part::text("How many push-ups?")])
///     .with_system_instruction("Be brief.");
/// assert!(!request.has_inline_data());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateRequest {
    pub system_instruction: Option<String>,
    pub parts: Vec<Part>,
    /// Requested response MIME type, e.g. `application/json`
    pub response_mime_type: Option<String>,
    /// JSON schema the response must follow (provider schema dialect)
    pub response_schema: Option<serde_json::Value>,
}

impl GenerateRequest {
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            parts,
            ..Default::default()
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Ask for JSON output following `schema`
    pub fn with_json_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_mime_type = Some("application/json".to_string());
        self.response_schema = Some(schema);
        self
    }

    /// Whether any part carries binary data (and so needs a vision model)
    pub fn has_inline_data(&self) -> bool {
        self.parts.iter().any(Part::is_inline_data)
    }
}

/// Provider trait for generative AI backends
///
/// # Examples
///
/// ```no_run
/// use fitbot::providers::{GenerateRequest, Provider};
/// use fitbot::error::Result;
/// use async_trait::async_trait;
///
/// struct Canned;
///
/// #[async_trait]
/// impl Provider for Canned {
///     fn name(&self) -> &str {
///         "canned"
///     }
///
///     async fn generate(&self, _request: GenerateRequest) -> Result<String> {
///         Ok("Drink more water.".to_string())
///     }
/// }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short provider name used in logs
    fn name(&self) -> &str;

    /// Generate a reply and return its text
    ///
    /// # Errors
    ///
    /// Returns error if the request cannot be sent, the service answers
    /// with an error status, or the reply carries no text
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builders() {
        let request = GenerateRequest::new(vec![Part::jpeg(vec![1, 2, 3]), Part::text("hi")])
            .with_system_instruction("system")
            .with_json_schema(serde_json::json!({"type": "ARRAY"}));

        assert!(request.has_inline_data());
        assert_eq!(request.system_instruction.as_deref(), Some("system"));
        assert_eq!(request.response_mime_type.as_deref(), Some("application/json"));
        assert!(request.response_schema.is_some());
    }

    #[test]
    fn test_part_helpers() {
        assert!(!Part::text("x").is_inline_data());
        match Part::jpeg(vec![9]) {
            Part::InlineData { mime_type, data } => {
                assert_eq!(mime_type, "image/jpeg");
                assert_eq!(data, vec![9]);
            }
            other => panic!("unexpected part {:?}", other),
        }
    }
}
