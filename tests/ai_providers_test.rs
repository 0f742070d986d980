//! Wiremock integration tests for the OpenAI and Gemini meal generators,
//! plus an end-to-end API-to-AI fallback over HTTP.

use std::sync::Arc;

use larder::providers::{GeminiClient, OpenAiClient, SpoonacularClient};
use larder::{
    AiProvider, ApiSource, FindRecipesRequest, Larder, LarderError, MealGenerator,
    RecipeSuggestions,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn openai_reply(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn gemini_reply(parts: &[&str]) -> serde_json::Value {
    let parts: Vec<_> = parts.iter().map(|text| json!({ "text": text })).collect();
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": parts},
            "finishReason": "STOP"
        }]
    })
}

// ============================================================================
// OpenAI
// ============================================================================

/// Test chat completion request shape and fence stripping.
#[tokio::test]
async fn test_openai_generate_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "response_format": {"type": "json_object"}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(openai_reply("```json\n{\"meals\": [{\"name\": \"Soup\"}]}\n```")),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url(Some("sk-test".into()), mock_server.uri());
    let json = client
        .generate_meal_json("three dinners")
        .await
        .expect("generation should succeed");

    assert_eq!(json, "{\"meals\": [{\"name\": \"Soup\"}]}");
}

/// Test the configured model is sent.
#[tokio::test]
async fn test_openai_model_override() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({ "model": "gpt-4o" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("{\"meals\": []}")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client =
        OpenAiClient::with_base_url(Some("sk-test".into()), mock_server.uri()).model("gpt-4o");
    assert_eq!(client.generate_meal_json("x").await.unwrap(), "{\"meals\": []}");
}

/// Test a missing key fails without any HTTP call.
#[tokio::test]
async fn test_openai_missing_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("{}")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url(None, mock_server.uri());
    let err = client.generate_meal_json("dinner").await.unwrap_err();
    assert!(matches!(err, LarderError::Configuration(_)));
}

/// Test an empty completion maps to EmptyResponse.
#[tokio::test]
async fn test_openai_empty_completion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url(Some("sk-test".into()), mock_server.uri());
    let err = client.generate_meal_json("dinner").await.unwrap_err();
    assert!(matches!(err, LarderError::EmptyResponse));
}

/// Test non-success statuses map to errors.
#[tokio::test]
async fn test_openai_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&mock_server)
        .await;

    let client = OpenAiClient::with_base_url(Some("sk-test".into()), mock_server.uri());
    let err = client.generate_meal_json("dinner").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

// ============================================================================
// Gemini
// ============================================================================

/// Test generateContent request shape; multi-part text is joined.
#[tokio::test]
async fn test_gemini_generate_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .and(header("x-goog-api-key", "gm-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [{"text": "a vegan lunch"}]}],
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_reply(&["{\"meals\": [{\"name\": ", "\"Falafel\"}]}"])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GeminiClient::with_base_url(Some("gm-key".into()), mock_server.uri());
    let json = client
        .generate_meal_json("a vegan lunch")
        .await
        .expect("generation should succeed");

    assert_eq!(json, "{\"meals\": [{\"name\": \"Falafel\"}]}");
}

/// Test the model is part of the path.
#[tokio::test]
async fn test_gemini_model_override() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-pro:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(&["[]"])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GeminiClient::with_base_url(Some("gm-key".into()), mock_server.uri())
        .model("gemini-2.0-pro");
    assert_eq!(client.generate_meal_json("x").await.unwrap(), "[]");
}

/// Test a blank key fails without any HTTP call.
#[tokio::test]
async fn test_gemini_blank_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply(&["{}"])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = GeminiClient::with_base_url(Some("   ".into()), mock_server.uri());
    let err = client.generate_meal_json("dinner").await.unwrap_err();
    assert!(matches!(err, LarderError::Configuration(_)));
}

/// Test a candidate without text maps to EmptyResponse.
#[tokio::test]
async fn test_gemini_empty_candidate() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-1.5-flash:generateContent"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "candidates": [{ "finishReason": "SAFETY" }] })),
        )
        .mount(&mock_server)
        .await;

    let client = GeminiClient::with_base_url(Some("gm-key".into()), mock_server.uri());
    let err = client.generate_meal_json("dinner").await.unwrap_err();
    assert!(matches!(err, LarderError::EmptyResponse));
}

/// Test 403 maps to AuthenticationFailed and keeps its status.
#[tokio::test]
async fn test_gemini_forbidden() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let client = GeminiClient::with_base_url(Some("gm-key".into()), mock_server.uri());
    let err = client.generate_meal_json("dinner").await.unwrap_err();
    assert!(matches!(
        err,
        LarderError::AuthenticationFailed { status: 403 }
    ));
    assert_eq!(err.status(), Some(403));
}

/// Test the provider factory targets the given base URL.
#[tokio::test]
async fn test_factory_with_base_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(openai_reply("{\"meals\": []}")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let generator =
        AiProvider::OpenAi.build_with_base_url(Some("sk-test".into()), mock_server.uri());
    assert_eq!(generator.name(), "openai");
    generator.generate_meal_json("x").await.unwrap();
}

// ============================================================================
// Transport failures
// ============================================================================

/// Port 1 on loopback refuses connections.
const CLOSED_PORT: &str = "http://127.0.0.1:1";

/// Test a connection failure never echoes the Gemini key.
#[tokio::test]
async fn test_gemini_transport_error_hides_key() {
    let client = GeminiClient::with_base_url(Some("gm-secret-key".into()), CLOSED_PORT);
    let err = client.generate_meal_json("dinner").await.unwrap_err();

    assert!(matches!(err, LarderError::Http(_)));
    let message = err.to_string();
    assert!(!message.contains("gm-secret-key"), "key leaked: {message}");
    assert!(!message.contains("127.0.0.1"), "url leaked: {message}");
}

/// Test a connection failure never echoes the OpenAI key.
#[tokio::test]
async fn test_openai_transport_error_hides_key() {
    let client = OpenAiClient::with_base_url(Some("sk-secret-key".into()), CLOSED_PORT);
    let err = client.generate_meal_json("dinner").await.unwrap_err();

    assert!(matches!(err, LarderError::Http(_)));
    assert!(!err.to_string().contains("sk-secret-key"));
}

// ============================================================================
// End to end
// ============================================================================

/// Test a failing recipe API falls back to the AI generator over HTTP.
#[tokio::test]
async fn test_api_outage_falls_back_to_openai() {
    let recipe_api = MockServer::start().await;
    let openai = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/recipes/findByIngredients"))
        .respond_with(ResponseTemplate::new(502))
        .expect(1)
        .mount(&recipe_api)
        .await;

    let meals = json!({
        "meals": [{
            "name": "Spinach omelette",
            "ingredients": ["eggs", "spinach", "butter"],
            "nutrition": {"protein": 20, "carbs": 2, "fat": 22}
        }]
    });
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(openai_reply(&format!("```json\n{meals}\n```"))),
        )
        .expect(1)
        .mount(&openai)
        .await;

    let service = Larder::builder()
        .recipe_source(
            ApiSource::Spoonacular,
            Arc::new(SpoonacularClient::with_base_url(
                "rapid-key",
                "spoonacular.test",
                recipe_api.uri(),
            )),
        )
        .meal_generator(Arc::new(OpenAiClient::with_base_url(
            Some("sk-test".into()),
            openai.uri(),
        )))
        .build()
        .unwrap();

    let request = FindRecipesRequest::new(["egg", "spinach"]);
    let first = service.find_recipes(&request).await.unwrap();
    // Served from cache; the `.expect(1)` mocks verify no second round trip.
    let second = service.find_recipes(&request).await.unwrap();
    assert_eq!(first, second);

    let RecipeSuggestions::Ai { provider, meals } = first else {
        panic!("expected AI suggestions");
    };
    assert_eq!(provider, "openai");
    assert_eq!(meals[0].name, "Spinach omelette");
    // 20*4 + 2*4 + 22*9
    assert_eq!(meals[0].nutrition.calories, 286.0);
    assert_eq!(meals[0].match_percentage, Some(67));
}
