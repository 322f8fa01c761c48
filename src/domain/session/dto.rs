use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::shell::{ExchangeKind, StepOutcome};
use super::state::SessionState;
use crate::domain::enhance::Modality;

/// 세션 내 프롬프트 제출 요청
///
/// 빈 프롬프트는 에러가 아니라 경고 결과로 처리하므로 최소 길이 검증을 하지 않습니다.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionEnhanceRequest {
    #[validate(length(max = 5000, message = "프롬프트는 5000자 이하여야 합니다"))]
    #[serde(default)]
    #[schema(example = "write a bedtime story for children")]
    pub prompt: String,

    #[serde(default)]
    #[schema(value_type = String, example = "text")]
    pub target_model: Modality,
}

/// 세션 상태 조회 응답
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    pub last_input: String,
    #[schema(value_type = String, example = "text")]
    pub last_target: Modality,
    pub last_output: String,
    pub pending_retry: bool,
    pub pending_dislike_feedback: Option<String>,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTime<Utc>,
}

impl From<&SessionState> for SessionView {
    fn from(state: &SessionState) -> Self {
        Self {
            session_id: state.id.to_string(),
            last_input: state.last_input.clone(),
            last_target: state.last_target.clone(),
            last_output: state.last_output.clone(),
            pending_retry: state.pending_retry,
            pending_dislike_feedback: state.pending_dislike_feedback.clone(),
            created_at: state.created_at,
            updated_at: state.updated_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Enhanced,
    Warning,
    Acknowledged,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    Submit,
    Retry,
    Dislike,
}

impl From<ExchangeKind> for StepAction {
    fn from(kind: ExchangeKind) -> Self {
        match kind {
            ExchangeKind::Submit => StepAction::Submit,
            ExchangeKind::Retry => StepAction::Retry,
            ExchangeKind::Dislike => StepAction::Dislike,
        }
    }
}

/// 세션 처리 단계 응답
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepResponse {
    pub outcome: StepKind,
    pub action: Option<StepAction>,
    pub enhanced_prompt: Option<String>,
    /// 사용자에게 보여줄 경고 또는 확인 메시지
    pub notice: Option<String>,
    pub session: SessionView,
}

impl StepResponse {
    pub fn new(outcome: StepOutcome, state: &SessionState) -> Self {
        let session = SessionView::from(state);
        match outcome {
            StepOutcome::Enhanced { kind, output } => Self {
                outcome: StepKind::Enhanced,
                action: Some(kind.into()),
                enhanced_prompt: Some(output),
                notice: None,
                session,
            },
            StepOutcome::Warning(message) => Self {
                outcome: StepKind::Warning,
                action: None,
                enhanced_prompt: None,
                notice: Some(message.to_string()),
                session,
            },
            StepOutcome::Acknowledged(message) => Self {
                outcome: StepKind::Acknowledged,
                action: None,
                enhanced_prompt: None,
                notice: Some(message.to_string()),
                session,
            },
            StepOutcome::Idle => Self {
                outcome: StepKind::Idle,
                action: None,
                enhanced_prompt: None,
                notice: None,
                session,
            },
        }
    }
}

/// 세션 처리 단계 성공 응답 (OpenAPI 스키마용)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StepSuccessResponse {
    #[schema(example = true)]
    pub is_success: bool,
    #[schema(example = "COMMON200")]
    pub code: String,
    #[schema(example = "성공입니다.")]
    pub message: String,
    pub result: StepResponse,
}

/// 세션 조회 성공 응답 (OpenAPI 스키마용)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionSuccessResponse {
    #[schema(example = true)]
    pub is_success: bool,
    #[schema(example = "COMMON200")]
    pub code: String,
    #[schema(example = "성공입니다.")]
    pub message: String,
    pub result: SessionView,
}
