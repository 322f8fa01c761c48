use std::time::Instant;

use super::client::ModelClient;
use super::modality::Modality;
use super::prompt;
use super::retry::{with_retry, RetryPolicy};
use crate::error::AppError;

/// 프롬프트 강화 서비스
///
/// 지시문 조립, 모델 호출(재시도 포함), 결과 정리를 담당합니다.
#[derive(Clone)]
pub struct EnhanceService {
    client: ModelClient,
    retry_policy: RetryPolicy,
}

impl EnhanceService {
    pub fn new(client: ModelClient, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            retry_policy,
        }
    }

    /// 사용자 프롬프트를 대상 모델에 맞게 강화
    ///
    /// 빈 프롬프트도 그대로 지시문으로 만들어 보냅니다. 빈 입력 거부는 호출하는 쪽의 책임입니다.
    pub async fn enhance(&self, user_prompt: &str, modality: &Modality) -> Result<String, AppError> {
        let instruction = prompt::build_instruction(user_prompt, modality);

        if !modality.is_known() {
            tracing::debug!(modality = %modality, "Unknown modality, sending without elaboration template");
        }

        tracing::info!(
            prompt_length = user_prompt.len(),
            modality = %modality,
            "Enhancing prompt"
        );

        let start = Instant::now();
        let result = with_retry(self.retry_policy, || {
            let client = self.client.clone();
            let instruction = instruction.clone();
            async move { client.generate(&instruction).await }
        })
        .await;

        let elapsed = start.elapsed();
        metrics::histogram!("prompt_enhance_duration_seconds", "modality" => modality.to_string())
            .record(elapsed.as_secs_f64());

        match result {
            Ok(raw) => {
                metrics::counter!("prompt_enhance_total", "outcome" => "success").increment(1);
                let enhanced = raw.trim().to_string();
                tracing::info!(
                    enhanced_length = enhanced.len(),
                    duration_ms = elapsed.as_millis() as u64,
                    "Prompt enhanced"
                );
                Ok(enhanced)
            }
            Err(e) => {
                metrics::counter!("prompt_enhance_total", "outcome" => e.error_code()).increment(1);
                Err(e)
            }
        }
    }
}
