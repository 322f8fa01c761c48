//! 프롬프트 강화 API 테스트
//!
//! axum-test를 사용한 HTTP 핸들러 레이어 테스트

use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use prompt_alchemist::{create_test_router_with_mock, error::AppError, ModelClientTrait};
use serde_json::json;

/// 테스트용 Mock 모델 클라이언트 (성공 응답, 지시문 기록)
struct RecordingClient {
    response: String,
    instructions: Arc<Mutex<Vec<String>>>,
}

impl RecordingClient {
    fn new(response: &str) -> (Self, Arc<Mutex<Vec<String>>>) {
        let instructions = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                response: response.to_string(),
                instructions: instructions.clone(),
            },
            instructions,
        )
    }
}

#[async_trait::async_trait]
impl ModelClientTrait for RecordingClient {
    async fn generate(&self, instruction: &str) -> Result<String, AppError> {
        self.instructions
            .lock()
            .unwrap()
            .push(instruction.to_string());
        Ok(self.response.clone())
    }

    async fn health_check(&self) -> Result<String, AppError> {
        Ok("ok".to_string())
    }
}

/// 테스트용 Mock 모델 클라이언트 (에러 응답)
struct MockClientError {
    make_error: fn() -> AppError,
}

#[async_trait::async_trait]
impl ModelClientTrait for MockClientError {
    async fn generate(&self, _instruction: &str) -> Result<String, AppError> {
        Err((self.make_error)())
    }

    async fn health_check(&self) -> Result<String, AppError> {
        Err((self.make_error)())
    }
}

mod enhance_handler {
    use super::*;

    #[tokio::test]
    async fn should_return_200_with_trimmed_enhanced_prompt() {
        // Arrange
        let (mock, instructions) = RecordingClient::new("  A detailed bedtime story prompt.  \n");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        // Act
        let response = server
            .post("/api/enhance")
            .json(&json!({
                "prompt": "write a bedtime story",
                "targetModel": "text"
            }))
            .await;

        // Assert
        response.assert_status_ok();
        response.assert_json_contains(&json!({
            "isSuccess": true,
            "code": "COMMON200",
            "result": {
                "originalPrompt": "write a bedtime story",
                "targetModel": "text",
                "enhancedPrompt": "A detailed bedtime story prompt."
            }
        }));

        let sent = instructions.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("User Prompt: write a bedtime story\n\n"));
        assert!(sent[0].ends_with("Enhanced Prompt:"));
    }

    #[tokio::test]
    async fn should_default_target_model_to_text() {
        let (mock, instructions) = RecordingClient::new("ok");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        let response = server
            .post("/api/enhance")
            .json(&json!({ "prompt": "summarize this article" }))
            .await;

        response.assert_status_ok();
        response.assert_json_contains(&json!({ "result": { "targetModel": "text" } }));
        assert!(instructions.lock().unwrap()[0].contains("suitable for text-based generation."));
    }

    #[tokio::test]
    async fn should_normalize_target_model_case() {
        let (mock, instructions) = RecordingClient::new("ok");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        let response = server
            .post("/api/enhance")
            .json(&json!({ "prompt": "a sunset", "targetModel": "Image" }))
            .await;

        response.assert_status_ok();
        response.assert_json_contains(&json!({ "result": { "targetModel": "image" } }));
        assert!(instructions.lock().unwrap()[0].contains("suitable for image-based generation."));
    }

    #[tokio::test]
    async fn should_accept_unknown_target_model() {
        // Arrange
        let (mock, instructions) = RecordingClient::new("ok");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        // Act
        let response = server
            .post("/api/enhance")
            .json(&json!({ "prompt": "a jingle", "targetModel": "audio" }))
            .await;

        // Assert
        response.assert_status_ok();
        response.assert_json_contains(&json!({ "result": { "targetModel": "audio" } }));
        let sent = instructions.lock().unwrap();
        assert!(sent[0].ends_with("User Prompt: a jingle\n\n\nEnhanced Prompt:"));
    }

    #[tokio::test]
    async fn should_return_400_for_empty_prompt() {
        // Arrange
        let (mock, instructions) = RecordingClient::new("unused");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        // Act
        let response = server
            .post("/api/enhance")
            .json(&json!({ "prompt": "", "targetModel": "text" }))
            .await;

        // Assert
        response.assert_status_bad_request();
        response.assert_json_contains(&json!({
            "isSuccess": false,
            "code": "PROMPT_001"
        }));
        assert!(instructions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_400_for_blank_prompt() {
        let (mock, instructions) = RecordingClient::new("unused");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        let response = server
            .post("/api/enhance")
            .json(&json!({ "prompt": "   \n\t", "targetModel": "code" }))
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({ "code": "PROMPT_001" }));
        assert!(instructions.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_return_400_for_too_long_prompt() {
        let (mock, _) = RecordingClient::new("unused");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        let response = server
            .post("/api/enhance")
            .json(&json!({ "prompt": "a".repeat(5001) }))
            .await;

        response.assert_status_bad_request();
        response.assert_json_contains(&json!({ "code": "COMMON400" }));
    }

    #[tokio::test]
    async fn should_return_400_for_missing_prompt() {
        let (mock, _) = RecordingClient::new("unused");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        let response = server
            .post("/api/enhance")
            .json(&json!({ "targetModel": "text" }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn should_return_400_for_invalid_json() {
        // Arrange
        let (mock, _) = RecordingClient::new("unused");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        // Act
        let response = server
            .post("/api/enhance")
            .content_type("application/json")
            .bytes("{invalid json}".as_bytes().into())
            .await;

        // Assert
        response.assert_status_bad_request();
        response.assert_json_contains(&json!({ "code": "COMMON400" }));
    }

    #[tokio::test]
    async fn should_return_502_when_model_auth_fails() {
        // Arrange
        let mock = MockClientError {
            make_error: || AppError::ModelAuthError,
        };
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        // Act
        let response = server
            .post("/api/enhance")
            .json(&json!({ "prompt": "hello" }))
            .await;

        // Assert
        response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
        response.assert_json_contains(&json!({
            "isSuccess": false,
            "code": "MODEL_001"
        }));
    }

    #[tokio::test]
    async fn should_return_429_when_model_rate_limit_persists() {
        let mock = MockClientError {
            make_error: || AppError::ModelRateLimitError,
        };
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        let response = server
            .post("/api/enhance")
            .json(&json!({ "prompt": "hello" }))
            .await;

        response.assert_status(axum::http::StatusCode::TOO_MANY_REQUESTS);
        response.assert_json_contains(&json!({ "code": "MODEL_002" }));
    }

    #[tokio::test]
    async fn should_return_503_when_model_is_temporarily_down() {
        let mock = MockClientError {
            make_error: || AppError::ModelTemporaryError,
        };
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        let response = server
            .post("/api/enhance")
            .json(&json!({ "prompt": "hello" }))
            .await;

        response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
        response.assert_json_contains(&json!({ "code": "MODEL_003" }));
    }

    #[tokio::test]
    async fn should_return_502_for_other_model_errors() {
        let mock = MockClientError {
            make_error: || AppError::ModelError("invalid model".to_string()),
        };
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        let response = server
            .post("/api/enhance")
            .json(&json!({ "prompt": "hello" }))
            .await;

        response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
        response.assert_json_contains(&json!({ "code": "MODEL_004" }));
    }
}

mod request_id {
    use super::*;
    use axum::http::{HeaderName, HeaderValue};

    #[tokio::test]
    async fn should_echo_incoming_request_id() {
        let (mock, _) = RecordingClient::new("ok");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        let response = server
            .post("/api/enhance")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("req-123"),
            )
            .json(&json!({ "prompt": "hello" }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.header("x-request-id"), "req-123");
    }

    #[tokio::test]
    async fn should_generate_request_id_when_missing() {
        let (mock, _) = RecordingClient::new("ok");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        let response = server
            .post("/api/enhance")
            .json(&json!({ "prompt": "hello" }))
            .await;

        let request_id = response.header("x-request-id");
        assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
    }
}

mod health_handler {
    use super::*;

    #[tokio::test]
    async fn should_return_healthy_status() {
        // Arrange
        let (mock, _) = RecordingClient::new("ok");
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        // Act
        let response = server.get("/health").await;

        // Assert
        response.assert_status_ok();
        response.assert_json_contains(&json!({
            "status": "healthy",
            "activeSessions": 0,
            "checks": { "modelApi": { "status": true } }
        }));
    }

    #[tokio::test]
    async fn should_return_503_when_model_is_unreachable() {
        let mock = MockClientError {
            make_error: || AppError::ModelAuthError,
        };
        let server = TestServer::new(create_test_router_with_mock(mock)).unwrap();

        let response = server.get("/health").await;

        response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
        response.assert_json_contains(&json!({
            "status": "unhealthy",
            "checks": { "modelApi": { "status": false, "error": "MODEL_001" } }
        }));
    }
}
