use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::enhance::Modality;
use crate::error::AppError;

/// 결과 패널에서 전달되는 사용자 피드백
///
/// 전송 방식과 무관하게 세션 상태 전이에만 쓰이는 타입입니다.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FeedbackEvent {
    /// 직전 요청을 같은 입력으로 다시 실행
    Retry,
    /// 자유 텍스트 피드백을 덧붙여 다시 실행
    Dislike {
        #[serde(default)]
        feedback: String,
    },
    /// 표시용 확인만 하고 상태는 변경하지 않음
    Like,
}

/// 피드백이 비어 있을 때 대신 쓰는 문구
pub const EMPTY_FEEDBACK_PLACEHOLDER: &str = "No feedback provided.";

/// 싫어요 피드백 최대 길이 (문자 수, 프롬프트 제한과 동일)
pub const MAX_FEEDBACK_CHARS: usize = 5000;

impl FeedbackEvent {
    /// 피드백 길이 검증
    pub fn check_length(&self) -> Result<(), AppError> {
        match self {
            FeedbackEvent::Dislike { feedback } if feedback.chars().count() > MAX_FEEDBACK_CHARS => {
                Err(AppError::ValidationError(format!(
                    "피드백은 {}자 이하여야 합니다",
                    MAX_FEEDBACK_CHARS
                )))
            }
            _ => Ok(()),
        }
    }
}

/// 세션 하나의 상태
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: Uuid,
    pub last_input: String,
    pub last_target: Modality,
    pub last_output: String,
    pub pending_retry: bool,
    pub pending_dislike_feedback: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            last_input: String::new(),
            last_target: Modality::default(),
            last_output: String::new(),
            pending_retry: false,
            pending_dislike_feedback: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// 이전에 성공한 요청이 있는지 여부
    pub fn has_exchange(&self) -> bool {
        !self.last_input.is_empty()
    }

    pub fn has_pending(&self) -> bool {
        self.pending_retry || self.pending_dislike_feedback.is_some()
    }

    /// 피드백 이벤트를 대기 플래그로 기록
    ///
    /// Like는 플래그를 남기지 않으며 `false`를 반환합니다.
    pub fn signal(&mut self, event: FeedbackEvent) -> bool {
        self.touch();
        match event {
            FeedbackEvent::Retry => {
                self.pending_retry = true;
                true
            }
            FeedbackEvent::Dislike { feedback } => {
                let feedback = if feedback.trim().is_empty() {
                    EMPTY_FEEDBACK_PLACEHOLDER.to_string()
                } else {
                    feedback
                };
                self.pending_dislike_feedback = Some(feedback);
                true
            }
            FeedbackEvent::Like => false,
        }
    }

    /// 성공한 요청 결과 기록
    pub(crate) fn record_exchange(&mut self, input: String, target: Modality, output: String) {
        self.last_input = input;
        self.last_target = target;
        self.last_output = output;
        self.touch();
    }

    pub(crate) fn record_output(&mut self, output: String) {
        self.last_output = output;
        self.touch();
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
