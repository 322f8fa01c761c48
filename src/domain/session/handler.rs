use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use super::dto::{
    SessionEnhanceRequest, SessionSuccessResponse, SessionView, StepResponse, StepSuccessResponse,
};
use super::shell::{process_step, StepOutcome, Submission, LIKE_ACKNOWLEDGEMENT};
use super::state::FeedbackEvent;
use crate::error::AppError;
use crate::response::{BaseResponse, ErrorResponse};
use crate::AppState;

/// 세션 생성
#[utoipa::path(
    post,
    path = "/api/sessions",
    tag = "Session",
    responses(
        (status = 201, description = "세션 생성 성공", body = SessionSuccessResponse)
    )
)]
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<BaseResponse<SessionView>>) {
    let handle = state.sessions.create().await;
    let session = handle.lock().await;

    (
        StatusCode::CREATED,
        Json(BaseResponse::created(SessionView::from(&*session))),
    )
}

/// 세션 상태 조회
#[utoipa::path(
    get,
    path = "/api/sessions/{session_id}",
    tag = "Session",
    params(("session_id" = String, Path, description = "세션 ID (UUID)")),
    responses(
        (status = 200, description = "조회 성공", body = SessionSuccessResponse),
        (status = 404, description = "세션 없음", body = ErrorResponse)
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<BaseResponse<SessionView>>, AppError> {
    let handle = state.sessions.get(&session_id).await?;
    let session = handle.lock().await;

    Ok(Json(BaseResponse::success(SessionView::from(&*session))))
}

/// 세션 삭제
#[utoipa::path(
    delete,
    path = "/api/sessions/{session_id}",
    tag = "Session",
    params(("session_id" = String, Path, description = "세션 ID (UUID)")),
    responses(
        (status = 200, description = "삭제 성공"),
        (status = 404, description = "세션 없음", body = ErrorResponse)
    )
)]
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<BaseResponse<()>>, AppError> {
    state.sessions.remove(&session_id).await?;
    Ok(Json(BaseResponse::success(())))
}

/// 세션 내 프롬프트 강화
///
/// 빈 프롬프트는 모델을 호출하지 않고 경고를 반환합니다.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/enhance",
    tag = "Session",
    params(("session_id" = String, Path, description = "세션 ID (UUID)")),
    request_body = SessionEnhanceRequest,
    responses(
        (status = 200, description = "처리 완료 (강화 또는 경고)", body = StepSuccessResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 404, description = "세션 없음", body = ErrorResponse),
        (status = 502, description = "모델 API 에러", body = ErrorResponse)
    )
)]
pub async fn enhance_in_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    request: Result<Json<SessionEnhanceRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<StepResponse>>, AppError> {
    let Json(request) = request?;
    request.validate()?;

    let handle = state.sessions.get(&session_id).await?;
    let mut session = handle.lock().await;

    tracing::info!(
        session_id = %session_id,
        prompt_length = request.prompt.len(),
        target_model = %request.target_model,
        "Session enhance request received"
    );

    let submission = Submission {
        prompt: request.prompt,
        target: request.target_model,
    };
    let outcome = process_step(&mut session, &state.enhance_service, Some(submission)).await?;

    Ok(Json(BaseResponse::success(StepResponse::new(
        outcome, &session,
    ))))
}

/// 결과 패널 피드백 처리
///
/// retry, dislike 이벤트는 대기 플래그를 기록한 뒤 바로 한 단계를 처리합니다.
/// like 이벤트는 상태를 바꾸지 않고 확인 메시지만 반환합니다.
#[utoipa::path(
    post,
    path = "/api/sessions/{session_id}/events",
    tag = "Session",
    params(("session_id" = String, Path, description = "세션 ID (UUID)")),
    request_body = FeedbackEvent,
    responses(
        (status = 200, description = "처리 완료", body = StepSuccessResponse),
        (status = 400, description = "잘못된 이벤트", body = ErrorResponse),
        (status = 404, description = "세션 없음", body = ErrorResponse),
        (status = 502, description = "모델 API 에러", body = ErrorResponse)
    )
)]
pub async fn handle_feedback(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    event: Result<Json<FeedbackEvent>, JsonRejection>,
) -> Result<Json<BaseResponse<StepResponse>>, AppError> {
    let Json(event) = event?;
    event.check_length()?;

    let handle = state.sessions.get(&session_id).await?;
    let mut session = handle.lock().await;

    tracing::info!(session_id = %session_id, event = ?event, "Feedback event received");

    let outcome = if session.signal(event) {
        process_step(&mut session, &state.enhance_service, None).await?
    } else {
        StepOutcome::Acknowledged(LIKE_ACKNOWLEDGEMENT)
    };

    Ok(Json(BaseResponse::success(StepResponse::new(
        outcome, &session,
    ))))
}
