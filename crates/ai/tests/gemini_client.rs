use std::sync::{Arc, Mutex};

use agrointel_ai::{GeminiClient, ImagePayload, InferenceConfig, InferenceError, InferenceService};
use agrointel_core::{ChatMessage, CropRecommendationInput, ErrorKind, Reading};
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::{Json, Router};
use serde_json::{json, Value};

/// What the fake endpoint saw: API key header + request body.
type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

#[derive(Clone)]
struct FakeGemini {
    status: StatusCode,
    reply: Value,
    seen: Seen,
}

async fn generate(
    State(fake): State<FakeGemini>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    fake.seen.lock().unwrap().push((key, body));
    (fake.status, Json(fake.reply.clone()))
}

struct TestServer {
    base_url: String,
    seen: Seen,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(status: StatusCode, reply: Value) -> Self {
        let seen: Seen = Arc::default();
        let app = Router::new().fallback(generate).with_state(FakeGemini {
            status,
            reply,
            seen: seen.clone(),
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            seen,
            handle,
        }
    }

    async fn replying_text(text: &str) -> Self {
        Self::spawn(
            StatusCode::OK,
            json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]}),
        )
        .await
    }

    fn client(&self) -> GeminiClient {
        GeminiClient::new(
            InferenceConfig::default()
                .with_api_key("test-key")
                .with_base_url(&self.base_url)
                .with_model("test-model"),
        )
    }

    fn requests(&self) -> Vec<(Option<String>, Value)> {
        self.seen.lock().unwrap().clone()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

const DIAGNOSIS: &str = r#"{"disease_found":true,"disease_name":"Leaf Spot","confidence":85,"severity":"Moderate","symptoms":"Brown spots","treatment_steps":[{"day":1,"action":"Remove infected leaves","cost_estimate":"₹0"},{"day":3,"action":"Apply fungicide"}],"prevention":"Airflow"}"#;

#[tokio::test]
async fn detection_sends_image_and_parses_fenced_json() {
    let server = TestServer::replying_text(&format!("```json\n{DIAGNOSIS}\n```")).await;
    let image = ImagePayload::jpeg(vec![0xff, 0xd8, 0xff, 0xe0]);

    let result = server.client().detect_disease(&image).await.unwrap();
    let finding = result.finding().expect("disease should be found");
    assert_eq!(finding.name, "Leaf Spot");
    assert_eq!(finding.treatment_steps.len(), 2);
    assert_eq!(result.confidence().percent(), 85);

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let (key, body) = &requests[0];
    assert_eq!(key.as_deref(), Some("test-key"));
    assert_eq!(
        body["contents"][0]["parts"][0]["inlineData"],
        json!({"mimeType": "image/jpeg", "data": "/9j/4A=="})
    );
    assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
}

#[tokio::test]
async fn invalid_confidence_is_malformed() {
    let server = TestServer::replying_text(&DIAGNOSIS.replace("85", "\"high\"")).await;
    let err = server
        .client()
        .detect_disease(&ImagePayload::jpeg(vec![1]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedResponse);
}

#[tokio::test]
async fn empty_candidates_are_malformed() {
    let server = TestServer::spawn(StatusCode::OK, json!({"candidates": []})).await;
    let err = server.client().chat(&[], "hello").await.unwrap_err();
    assert!(matches!(err, InferenceError::Malformed(_)));
}

#[tokio::test]
async fn server_errors_are_network_failures() {
    let server = TestServer::spawn(
        StatusCode::SERVICE_UNAVAILABLE,
        json!({"error": {"message": "overloaded"}}),
    )
    .await;
    let err = server.client().chat(&[], "hello").await.unwrap_err();
    assert!(matches!(err, InferenceError::Api { status: 503, .. }));
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
}

#[tokio::test]
async fn unreachable_service_is_a_network_failure() {
    let client = GeminiClient::new(
        InferenceConfig::default()
            .with_api_key("test-key")
            .with_base_url("http://127.0.0.1:1"),
    );
    let err = client.chat(&[], "hello").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NetworkFailure);
}

#[tokio::test]
async fn chat_history_starts_with_the_first_user_turn() {
    let server = TestServer::replying_text("  Sow after the first monsoon showers.  ").await;
    let history = vec![
        ChatMessage::assistant("Hello! I am your AgroIntel expert assistant."),
        ChatMessage::user("My coconut leaves are yellow"),
        ChatMessage::assistant("That can be a potassium deficiency."),
    ];

    let reply = server.client().chat(&history, "When should I sow rice?").await.unwrap();
    assert_eq!(reply, "Sow after the first monsoon showers.");

    let (_, body) = &server.requests()[0];
    let roles: Vec<&str> = body["contents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["user", "model", "user"]);
    assert_eq!(body["contents"][2]["parts"][0]["text"], "When should I sow rice?");
    assert_eq!(body["generationConfig"]["maxOutputTokens"], 500);
    assert!(body["systemInstruction"]["parts"][0]["text"].is_string());
}

#[tokio::test]
async fn recommendation_prompt_carries_every_reading() {
    let server = TestServer::replying_text(
        r#"{"recommended_crop":"Rice","confidence":88,"reasoning":"High rainfall","farming_tips":["Keep fields flooded"]}"#,
    )
    .await;
    let input = CropRecommendationInput::new(
        Reading::parse("nitrogen", "90").unwrap(),
        Reading::parse("phosphorus", "42").unwrap(),
        Reading::parse("potassium", "43").unwrap(),
        Reading::parse("ph", "6.5").unwrap(),
        Reading::parse("rainfall", "2500").unwrap(),
        "Thrissur",
    )
    .unwrap();

    let rec = server.client().recommend_crop(&input).await.unwrap();
    assert_eq!(rec.recommended_crop, "Rice");
    assert_eq!(rec.tips, vec!["Keep fields flooded"]);

    let (_, body) = &server.requests()[0];
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    for expected in ["Nitrogen: 90", "Phosphorus: 42", "Potassium: 43", "pH Level: 6.5", "Rainfall: 2500 mm", "Location: Thrissur"] {
        assert!(prompt.contains(expected), "prompt is missing {expected:?}");
    }
}
