//! Gemini HTTP contract tests
//!
//! Drives the real provider and gateway against a local mock server.

use fitbot::config::GeminiConfig;
use fitbot::error::FitbotError;
use fitbot::gateway::{self, AiGateway};
use fitbot::providers::{GeminiProvider, GenerateRequest, Part, Provider};
use fitbot::tracker::FoodEstimate;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn config_for(server: &MockServer) -> GeminiConfig {
    GeminiConfig {
        api_base: server.uri(),
        timeout_seconds: 5,
        ..GeminiConfig::default()
    }
}

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

fn gateway_for(server: &MockServer) -> AiGateway {
    let provider = GeminiProvider::new(config_for(server), "test-key".to_string()).unwrap();
    AiGateway::new(Some(Arc::new(provider)))
}

#[tokio::test]
async fn test_text_request_sends_key_and_system_instruction() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "systemInstruction": { "parts": [{ "text": gateway::SYSTEM_INSTRUCTION }] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Drink water.")))
        .expect(1)
        .mount(&server)
        .await;

    let answer = gateway_for(&server)
        .assistant_response("How do I stay hydrated?")
        .await;
    assert_eq!(answer, "Drink water.");
}

#[tokio::test]
async fn test_remote_failure_becomes_connection_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let answer = gateway_for(&server).assistant_response("hello").await;
    assert_eq!(answer, gateway::CONNECTION_ERROR_REPLY);
}

#[tokio::test]
async fn test_food_analysis_requests_json_schema() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(
            r#"[{"name": "Eggs", "calories": 150}, {"name": "Toast", "calories": 80}]"#,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let estimates = gateway_for(&server)
        .analyze_food_image(&[0xFF, 0xD8, 0xFF, 0xD9])
        .await
        .unwrap();
    assert_eq!(
        estimates,
        vec![
            FoodEstimate::new("Eggs", 150.0),
            FoodEstimate::new("Toast", 80.0)
        ]
    );
}

#[tokio::test]
async fn test_food_analysis_empty_array_is_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("[]")))
        .mount(&server)
        .await;

    let estimates = gateway_for(&server)
        .analyze_food_image(&[0xFF, 0xD8])
        .await
        .unwrap();
    assert!(estimates.is_empty());
}

#[tokio::test]
async fn test_food_analysis_transport_failure_is_distinct() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = gateway_for(&server)
        .analyze_food_image(&[0xFF, 0xD8])
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FitbotError>(),
        Some(FitbotError::FoodAnalysis(_))
    ));
    assert_eq!(gateway::scan_error_message(&err), gateway::FOOD_ANALYSIS_FAILED);
}

#[tokio::test]
async fn test_inline_image_is_base64_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_partial_json(json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "inlineData": { "mimeType": "image/jpeg", "data": "AQID" } },
                    { "text": "describe" }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new(config_for(&server), "test-key".to_string()).unwrap();
    let text = provider
        .generate(GenerateRequest::new(vec![
            Part::jpeg(vec![1, 2, 3]),
            Part::text("describe"),
        ]))
        .await
        .unwrap();
    assert_eq!(text, "ok");
}
