//! 대화형 세션 처리 단계
//!
//! 한 단계에서 최대 하나의 동작만 처리합니다.
//! 대기 중인 Retry, Dislike 순으로 먼저 확인하고, 둘 다 없을 때만 새 입력을 처리합니다.

use super::state::SessionState;
use crate::domain::enhance::{prompt, EnhanceService, Modality};
use crate::error::AppError;

pub const EMPTY_PROMPT_WARNING: &str = "Please enter a prompt.";
pub const NO_EXCHANGE_WARNING: &str = "Nothing to retry yet. Enhance a prompt first.";
pub const LIKE_ACKNOWLEDGEMENT: &str = "Thanks for the feedback!";

/// 사용자가 Enhance 버튼으로 제출한 입력
#[derive(Debug, Clone)]
pub struct Submission {
    pub prompt: String,
    pub target: Modality,
}

/// 모델을 호출한 동작 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeKind {
    Submit,
    Retry,
    Dislike,
}

/// 처리 단계 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Enhanced { kind: ExchangeKind, output: String },
    Warning(&'static str),
    Acknowledged(&'static str),
    Idle,
}

/// 세션 처리 단계 실행
///
/// 대기 플래그는 모델 호출 전에 소비하므로 호출이 실패해도 다음 단계에서 다시 실행되지 않습니다.
/// 실패 시 `last_*` 값은 바뀌지 않습니다.
pub async fn process_step(
    state: &mut SessionState,
    service: &EnhanceService,
    submission: Option<Submission>,
) -> Result<StepOutcome, AppError> {
    if state.pending_retry {
        state.pending_retry = false;

        if !state.has_exchange() {
            tracing::warn!(session_id = %state.id, "Retry requested without prior exchange");
            return Ok(StepOutcome::Warning(NO_EXCHANGE_WARNING));
        }

        tracing::info!(session_id = %state.id, "Processing retry");
        let output = service
            .enhance(&state.last_input, &state.last_target)
            .await?;
        state.record_output(output.clone());

        return Ok(StepOutcome::Enhanced {
            kind: ExchangeKind::Retry,
            output,
        });
    }

    if let Some(feedback) = state.pending_dislike_feedback.take() {
        if !state.has_exchange() {
            tracing::warn!(session_id = %state.id, "Dislike feedback without prior exchange");
            return Ok(StepOutcome::Warning(NO_EXCHANGE_WARNING));
        }

        tracing::info!(
            session_id = %state.id,
            feedback_length = feedback.len(),
            "Processing dislike feedback"
        );
        let updated_input = prompt::with_feedback(&state.last_input, &feedback);
        let output = service.enhance(&updated_input, &state.last_target).await?;
        state.record_output(output.clone());

        return Ok(StepOutcome::Enhanced {
            kind: ExchangeKind::Dislike,
            output,
        });
    }

    let Some(submission) = submission else {
        return Ok(StepOutcome::Idle);
    };

    if submission.prompt.trim().is_empty() {
        return Ok(StepOutcome::Warning(EMPTY_PROMPT_WARNING));
    }

    let output = service
        .enhance(&submission.prompt, &submission.target)
        .await?;
    state.record_exchange(submission.prompt, submission.target, output.clone());

    Ok(StepOutcome::Enhanced {
        kind: ExchangeKind::Submit,
        output,
    })
}
