use axum::{extract::State, http::StatusCode, Json};

use super::dto::{HealthState, HealthStatus};
use crate::AppState;

/// 서버 및 모델 API 상태 확인
///
/// 모델 API가 응답하지 않으면 503을 반환합니다.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "정상 또는 지연", body = HealthStatus),
        (status = 503, description = "모델 API 장애", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let active_sessions = state.sessions.len().await;
    let health = state.health.check_health(active_sessions).await;

    let status = match health.status {
        HealthState::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };

    (status, Json(health))
}
