//! `/api` 요청 한도
//!
//! 강화 요청은 매번 유료 모델 API를 호출하므로 클라이언트 IP별로 토큰 버킷 한도를 둡니다.
//! `/health`, `/metrics`, Swagger 문서는 한도 대상이 아닙니다.

use axum::{
    http::{header::RETRY_AFTER, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorError,
    GovernorLayer,
};

use crate::error::AppError;
use crate::response::BaseResponse;

/// 토큰 1개가 다시 채워지는 간격 (초)
const API_REPLENISH_SECS: u64 = 2;

/// IP당 연속으로 보낼 수 있는 최대 요청 수
const API_BURST: u32 = 20;

const QUOTA_EXCEEDED_CODE: &str = "RATE_LIMIT";

pub(crate) type ApiRateLimiter =
    GovernorLayer<SmartIpKeyExtractor, governor::middleware::NoOpMiddleware>;

/// `/api` 라우트에 붙일 한도 레이어
///
/// 클라이언트 IP는 `X-Forwarded-For`, `X-Real-IP`, `Forwarded` 헤더 순으로 찾고,
/// 없으면 소켓 주소(`ConnectInfo`)를 씁니다.
pub(crate) fn create_api_rate_limiter() -> Result<ApiRateLimiter, AppError> {
    let config = GovernorConfigBuilder::default()
        .per_second(API_REPLENISH_SECS)
        .burst_size(API_BURST)
        .key_extractor(SmartIpKeyExtractor)
        .error_handler(quota_exceeded)
        .finish()
        .ok_or_else(|| AppError::Internal("invalid /api rate limit quota".to_string()))?;

    Ok(GovernorLayer {
        config: Arc::new(config),
    })
}

/// 한도 초과 또는 IP 식별 실패 응답
fn quota_exceeded(err: GovernorError) -> Response {
    let wait_secs = match err {
        GovernorError::TooManyRequests { wait_time, .. } => Some(wait_time),
        GovernorError::UnableToExtractKey => {
            tracing::warn!("Client IP not found, rejecting /api request");
            None
        }
        _ => None,
    };

    metrics::counter!("api_rate_limited_total").increment(1);
    tracing::warn!(retry_after_secs = ?wait_secs, "/api quota exceeded");

    let body = BaseResponse::error(
        QUOTA_EXCEEDED_CODE,
        "요청이 너무 많습니다. 잠시 후 다시 시도해주세요.",
    );
    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();

    if let Some(value) = wait_secs.and_then(|secs| HeaderValue::from_str(&secs.to_string()).ok()) {
        response.headers_mut().insert(RETRY_AFTER, value);
    }

    response
}
