use std::sync::Arc;
use std::time::Duration;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use backoff::ExponentialBackoffBuilder;

use crate::config::AppConfig;
use crate::error::AppError;

/// 헬스체크 호출 타임아웃 상한
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// 모델 API 에러를 세분화된 AppError로 변환
fn classify_model_error(error: OpenAIError) -> AppError {
    match &error {
        OpenAIError::ApiError(api_err) => {
            let err_type = api_err.r#type.as_deref().unwrap_or("");
            let err_code = api_err.code.as_deref().unwrap_or("");
            let message = &api_err.message;
            let message_lower = message.to_lowercase();

            if err_code == "invalid_api_key"
                || message_lower.contains("api key")
                || err_type == "authentication_error"
                || err_type == "permission_denied"
            {
                AppError::ModelAuthError
            } else if err_type == "rate_limit_error"
                || err_code == "rate_limit_exceeded"
                || err_code == "resource_exhausted"
                || message_lower.contains("rate limit")
                || message_lower.contains("quota")
            {
                AppError::ModelRateLimitError
            } else if err_type == "server_error"
                || err_code.contains("server")
                || message_lower.contains("server")
                || message_lower.contains("unavailable")
            {
                AppError::ModelTemporaryError
            } else {
                AppError::ModelError(message.clone())
            }
        }
        OpenAIError::Reqwest(req_err) => {
            let status = req_err.status().map(|s| s.as_u16());
            if req_err.is_timeout() || req_err.is_connect() {
                AppError::ModelTemporaryError
            } else if matches!(status, Some(401) | Some(403)) {
                AppError::ModelAuthError
            } else if status == Some(429) {
                AppError::ModelRateLimitError
            } else if req_err
                .status()
                .map(|s| s.is_server_error())
                .unwrap_or(false)
            {
                AppError::ModelTemporaryError
            } else {
                AppError::ModelError(req_err.to_string())
            }
        }
        _ => AppError::ModelError(error.to_string()),
    }
}

/// 텍스트 생성 모델 인터페이스
///
/// 외부 모델 API 호출을 추상화하여 테스트에서 Mock 객체로 대체할 수 있습니다.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ModelClientTrait: Send + Sync {
    /// 지시문 하나를 보내고 생성된 텍스트를 그대로 반환
    async fn generate(&self, instruction: &str) -> Result<String, AppError>;

    /// 헬스체크용 최소 텍스트 생성
    ///
    /// 최소 토큰으로 호출하여 실제 생성이 가능한지만 확인합니다.
    async fn health_check(&self) -> Result<String, AppError>;
}

/// Arc로 래핑된 ModelClient (Clone 지원)
pub type ModelClient = Arc<dyn ModelClientTrait>;

/// OpenAI 호환 Chat Completions 클라이언트
///
/// 기본 설정은 Gemini의 OpenAI 호환 엔드포인트를 사용합니다.
#[derive(Clone)]
pub struct ChatCompletionClient {
    client: Client<OpenAIConfig>,
    model: String,
    timeout: Duration,
}

impl ChatCompletionClient {
    pub fn new(api_key: &str, api_base: &str, model: &str, timeout: Duration) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        // SDK 내부 재시도 끔. 재시도는 with_retry에서만 수행
        let no_sdk_retry = ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();
        Self {
            client: Client::with_config(config).with_backoff(no_sdk_retry),
            model: model.to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.model_api_key,
            &config.model_api_base,
            &config.model_name,
            config.model_timeout,
        )
    }

    async fn complete(
        &self,
        messages: Vec<ChatCompletionRequestMessage>,
        max_tokens: Option<u32>,
        timeout: Duration,
    ) -> Result<String, AppError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.as_str()).messages(messages);
        if let Some(max_tokens) = max_tokens {
            args.max_tokens(max_tokens);
        }
        let request = args.build().map_err(|e| AppError::Internal(e.to_string()))?;

        let response = tokio::time::timeout(timeout, self.client.chat().create(request))
            .await
            .map_err(|_| AppError::ModelTemporaryError)? // 타임아웃
            .map_err(classify_model_error)?;

        let content = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ModelError("No choices in model response".to_string()))?
            .message
            .content
            .unwrap_or_default();

        Ok(content)
    }
}

#[async_trait::async_trait]
impl ModelClientTrait for ChatCompletionClient {
    async fn generate(&self, instruction: &str) -> Result<String, AppError> {
        // 역할 분리 없이 지시문 전체를 단일 사용자 메시지로 보냄
        let messages = vec![build_user_message(instruction)?];
        self.complete(messages, None, self.timeout).await
    }

    async fn health_check(&self) -> Result<String, AppError> {
        let messages = vec![build_user_message("Respond with exactly 'ok'")?];
        let timeout = self.timeout.min(HEALTH_CHECK_TIMEOUT);
        self.complete(messages, Some(5), timeout).await
    }
}

pub(crate) fn build_user_message(content: &str) -> Result<ChatCompletionRequestMessage, AppError> {
    Ok(ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessageArgs::default()
            .content(content)
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn api_error(message: &str, r#type: Option<&str>, code: Option<&str>) -> OpenAIError {
        OpenAIError::ApiError(ApiError {
            message: message.to_string(),
            r#type: r#type.map(str::to_string),
            param: None,
            code: code.map(str::to_string),
        })
    }

    #[test]
    fn should_create_chat_completion_client() {
        let client = ChatCompletionClient::new(
            "test-api-key",
            "http://localhost:1/v1",
            "gemini-2.0-flash",
            Duration::from_secs(1),
        );
        assert_eq!(client.model, "gemini-2.0-flash");
        assert_eq!(client.timeout, Duration::from_secs(1));
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) {
        use tokio::io::AsyncReadExt;

        let mut received = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = match socket.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            received.extend_from_slice(&buf[..n]);
            let text = String::from_utf8_lossy(&received);
            if let Some(header_end) = text.find("\r\n\r\n") {
                let content_length = text[..header_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if received.len() >= header_end + 4 + content_length {
                    return;
                }
            }
        }
    }

    /// 항상 429를 반환하는 로컬 서버를 띄우고 주소와 요청 횟수를 반환
    async fn spawn_rate_limited_upstream() -> (String, Arc<AtomicUsize>) {
        use tokio::io::AsyncWriteExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    read_request(&mut socket).await;
                    let body = r#"{"error":{"message":"Rate limit reached","type":"rate_limit_error","param":null,"code":"rate_limit_exceeded"}}"#;
                    let response = format!(
                        "HTTP/1.1 429 Too Many Requests\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (format!("http://{}/v1", addr), hits)
    }

    #[tokio::test]
    async fn should_surface_upstream_429_as_rate_limit_error_without_sdk_retry() {
        // Arrange
        let (api_base, hits) = spawn_rate_limited_upstream().await;
        let client = ChatCompletionClient::new(
            "test-api-key",
            &api_base,
            "gemini-2.0-flash",
            Duration::from_secs(3),
        );

        // Act
        let started = std::time::Instant::now();
        let result = client.generate("write a haiku").await;

        // Assert
        assert!(matches!(result, Err(AppError::ModelRateLimitError)));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn health_check_should_time_out_on_silent_upstream() {
        // Arrange
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let client = ChatCompletionClient::new(
            "test-api-key",
            &format!("http://{}/v1", addr),
            "gemini-2.0-flash",
            Duration::from_millis(200),
        );

        // Act
        let result = client.health_check().await;

        // Assert
        assert!(matches!(result, Err(AppError::ModelTemporaryError)));
    }

    #[test]
    fn should_build_user_message() {
        let result = build_user_message("test instruction");
        assert!(matches!(result, Ok(ChatCompletionRequestMessage::User(_))));
    }

    #[test]
    fn should_classify_invalid_api_key_as_auth_error() {
        let error = api_error("API key not valid", Some("invalid_request_error"), None);
        assert!(matches!(classify_model_error(error), AppError::ModelAuthError));
    }

    #[test]
    fn should_classify_quota_as_rate_limit() {
        let error = api_error("Resource has been exhausted (e.g. check quota).", None, None);
        assert!(matches!(
            classify_model_error(error),
            AppError::ModelRateLimitError
        ));
    }

    #[test]
    fn should_classify_rate_limit_code() {
        let error = api_error("slow down", None, Some("rate_limit_exceeded"));
        assert!(matches!(
            classify_model_error(error),
            AppError::ModelRateLimitError
        ));
    }

    #[test]
    fn should_classify_server_error_as_temporary() {
        let error = api_error("The model is overloaded", Some("server_error"), None);
        assert!(matches!(
            classify_model_error(error),
            AppError::ModelTemporaryError
        ));
    }

    #[test]
    fn should_keep_message_for_other_api_errors() {
        let error = api_error("Invalid model name", Some("invalid_request_error"), None);
        match classify_model_error(error) {
            AppError::ModelError(msg) => assert_eq!(msg, "Invalid model name"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
