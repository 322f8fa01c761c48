//! 프롬프트 강화 지시문
//!
//! 사용자 프롬프트와 대상 모델 종류로 모델에 보낼 단일 지시문을 조립합니다.

use super::modality::Modality;

const TEXT_TEMPLATE: &str = "Elaborate the prompt for a text generation model with full context, structure, and desired tone. Always be specific and avoid ambiguity.";

const IMAGE_TEMPLATE: &str = "Expand the prompt with rich visual cues, including style, environment, lighting, and perspective. Always be specific and avoid ambiguity.";

const VIDEO_TEMPLATE: &str = "Enhance the prompt for a video generation AI with scene flow, camera angles, emotional tone, and pacing. Always be specific and avoid ambiguity.";

const CODE_TEMPLATE: &str = "Turn this into a complete coding prompt with language, function, input/output format, constraints, and examples. Always be specific and avoid ambiguity.";

/// 완성형 이어쓰기를 유도하는 마지막 줄
pub const COMPLETION_CUE: &str = "Enhanced Prompt:";

/// 모델 종류별 상세화 템플릿
///
/// 알 수 없는 종류는 빈 문자열입니다.
pub fn template(modality: &Modality) -> &'static str {
    match modality {
        Modality::Text => TEXT_TEMPLATE,
        Modality::Image => IMAGE_TEMPLATE,
        Modality::Video => VIDEO_TEMPLATE,
        Modality::Code => CODE_TEMPLATE,
        Modality::Other(_) => "",
    }
}

/// 모델에 보낼 지시문 생성
pub fn build_instruction(user_prompt: &str, modality: &Modality) -> String {
    format!(
        "You are a world-class AI prompt engineer. \
         Your task is to take vague user prompts and rewrite them in detailed, structured form, \
         suitable for {}-based generation.\n\n\
         User Prompt: {}\n\n\
         {}\n\
         {}",
        modality,
        user_prompt,
        template(modality),
        COMPLETION_CUE
    )
}

/// 싫어요 피드백을 이전 입력 뒤에 덧붙입니다.
pub fn with_feedback(last_input: &str, feedback: &str) -> String {
    format!("{}\n\nUser feedback: {}", last_input, feedback)
}
