use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::modality::Modality;

/// 프롬프트 강화 요청 DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    /// 강화할 원본 프롬프트 (1 ~ 5000자)
    #[validate(length(
        min = 1,
        max = 5000,
        message = "프롬프트는 1자 이상 5000자 이하여야 합니다"
    ))]
    #[schema(example = "write a bedtime story for children")]
    pub prompt: String,

    /// 대상 모델 종류 (text, image, video, code)
    #[serde(default)]
    #[schema(value_type = String, example = "text")]
    pub target_model: Modality,
}

/// 프롬프트 강화 응답 DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceResponse {
    /// 원본 프롬프트
    pub original_prompt: String,

    /// 적용된 대상 모델 종류
    #[schema(value_type = String, example = "text")]
    pub target_model: Modality,

    /// 강화된 프롬프트
    pub enhanced_prompt: String,
}

/// 프롬프트 강화 성공 응답 (OpenAPI 스키마용)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceSuccessResponse {
    #[schema(example = true)]
    pub is_success: bool,

    #[schema(example = "COMMON200")]
    pub code: String,

    #[schema(example = "성공입니다.")]
    pub message: String,

    pub result: EnhanceResponse,
}
