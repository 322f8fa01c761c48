use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use super::dto::{EnhanceRequest, EnhanceResponse, EnhanceSuccessResponse};
use crate::error::AppError;
use crate::response::{BaseResponse, ErrorResponse};
use crate::AppState;

/// 프롬프트 강화 (세션 없음)
///
/// 프롬프트와 대상 모델 종류를 받아 강화된 프롬프트를 반환합니다.
#[utoipa::path(
    post,
    path = "/api/enhance",
    tag = "Enhance",
    request_body = EnhanceRequest,
    responses(
        (status = 200, description = "강화 성공", body = EnhanceSuccessResponse),
        (status = 400, description = "잘못된 요청", body = ErrorResponse),
        (status = 429, description = "모델 요청 한도 초과", body = ErrorResponse),
        (status = 502, description = "모델 API 에러", body = ErrorResponse),
        (status = 503, description = "모델 API 일시 장애", body = ErrorResponse)
    )
)]
pub async fn enhance_prompt(
    State(state): State<AppState>,
    request: Result<Json<EnhanceRequest>, JsonRejection>,
) -> Result<Json<BaseResponse<EnhanceResponse>>, AppError> {
    // JSON 파싱 에러 처리
    let Json(request) = request?;

    tracing::info!(
        prompt_length = request.prompt.len(),
        target_model = %request.target_model,
        "Enhance request received"
    );

    if request.prompt.trim().is_empty() {
        return Err(AppError::EmptyPrompt);
    }
    request.validate()?;

    let enhanced_prompt = state
        .enhance_service
        .enhance(&request.prompt, &request.target_model)
        .await?;

    Ok(Json(BaseResponse::success(EnhanceResponse {
        original_prompt: request.prompt,
        target_model: request.target_model,
        enhanced_prompt,
    })))
}
