use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::response::ErrorResponse;

/// 애플리케이션 전역 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("프롬프트를 입력해주세요.")]
    EmptyPrompt,

    #[error("세션을 찾을 수 없습니다: {0}")]
    SessionNotFound(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("잘못된 요청 형식입니다: {0}")]
    JsonParseFailed(String),

    #[error("표준 입력이 닫혔습니다: {0}")]
    InputClosed(String),

    #[error("모델 API 인증에 실패했습니다.")]
    ModelAuthError,

    #[error("모델 API 요청 한도를 초과했습니다.")]
    ModelRateLimitError,

    #[error("모델 API가 일시적으로 응답하지 않습니다.")]
    ModelTemporaryError,

    #[error("모델 API 에러: {0}")]
    ModelError(String),

    #[error("내부 에러: {0}")]
    Internal(String),
}

impl AppError {
    /// 클라이언트에 노출할 에러 메시지
    ///
    /// 내부 에러는 상세 내용을 숨깁니다.
    pub fn message(&self) -> String {
        match self {
            AppError::Internal(_) => "서버 에러, 관리자에게 문의 바랍니다.".to_string(),
            other => other.to_string(),
        }
    }

    /// 에러 코드 반환
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::EmptyPrompt => "PROMPT_001",
            AppError::SessionNotFound(_) => "SESSION_001",
            AppError::ValidationError(_) => "COMMON400",
            AppError::JsonParseFailed(_) => "COMMON400",
            AppError::InputClosed(_) => "COMMON400",
            AppError::ModelAuthError => "MODEL_001",
            AppError::ModelRateLimitError => "MODEL_002",
            AppError::ModelTemporaryError => "MODEL_003",
            AppError::ModelError(_) => "MODEL_004",
            AppError::Internal(_) => "COMMON500",
        }
    }

    /// HTTP 상태 코드 반환
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::EmptyPrompt
            | AppError::ValidationError(_)
            | AppError::JsonParseFailed(_)
            | AppError::InputClosed(_) => StatusCode::BAD_REQUEST,
            AppError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ModelAuthError => StatusCode::BAD_GATEWAY,
            AppError::ModelRateLimitError => StatusCode::TOO_MANY_REQUESTS,
            AppError::ModelTemporaryError => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ModelError(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        match &self {
            AppError::Internal(detail) => {
                error!(detail = %detail, "Internal Server Error");
            }
            _ => {
                error!("Error [{}]: {}", error_code, self);
            }
        }

        let error_response = ErrorResponse::new(error_code, self.message());

        (status, Json(error_response)).into_response()
    }
}

/// JsonRejection을 AppError로 변환
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::JsonParseFailed(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}
