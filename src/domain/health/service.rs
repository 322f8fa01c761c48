use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::dto::{CheckResult, HealthChecks, HealthState, HealthStatus};
use crate::domain::enhance::ModelClient;

/// Degraded 상태 임계값 (2초)
const DEGRADED_THRESHOLD: Duration = Duration::from_secs(2);

/// 캐시 유효 시간 (30초)
const CACHE_DURATION: Duration = Duration::from_secs(30);

struct CachedHealth {
    result: CheckResult,
    cached_at: Instant,
}

/// 서버 가동 시간과 모델 API 상태를 보고합니다.
///
/// 모델 헬스체크는 비용이 들기 때문에 결과를 일정 시간 캐싱합니다.
pub struct HealthService {
    client: ModelClient,
    started_at: Instant,
    cache: RwLock<Option<CachedHealth>>,
}

impl HealthService {
    pub fn new(client: ModelClient) -> Self {
        Self {
            client,
            started_at: Instant::now(),
            cache: RwLock::new(None),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// 전체 헬스 체크 수행 (캐싱 적용)
    pub async fn check_health(&self, active_sessions: usize) -> HealthStatus {
        let model_check = self.check_model_cached().await;
        let status = determine_health_state(&model_check);

        HealthStatus {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: self.uptime_secs(),
            active_sessions,
            checks: HealthChecks {
                model_api: model_check,
            },
        }
    }

    async fn check_model_cached(&self) -> CheckResult {
        {
            let cached = self.cache.read().await;
            if let Some(ref c) = *cached {
                if c.cached_at.elapsed() < CACHE_DURATION {
                    tracing::debug!(
                        cache_age_secs = c.cached_at.elapsed().as_secs(),
                        "Using cached health check result"
                    );
                    return c.result.clone();
                }
            }
        }

        tracing::debug!("Performing fresh health check");
        let result = self.check_model_fresh().await;

        *self.cache.write().await = Some(CachedHealth {
            result: result.clone(),
            cached_at: Instant::now(),
        });

        result
    }

    async fn check_model_fresh(&self) -> CheckResult {
        let start = Instant::now();

        // 호출 타임아웃은 모델 클라이언트가 적용
        match self.client.health_check().await {
            Ok(_) => CheckResult {
                status: true,
                latency_ms: Some(start.elapsed().as_millis() as u64),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Model health check failed");
                CheckResult {
                    status: false,
                    latency_ms: Some(start.elapsed().as_millis() as u64),
                    error: Some(e.error_code().to_string()),
                }
            }
        }
    }
}

/// 모델 API 상태에 따른 전체 상태 결정
fn determine_health_state(check: &CheckResult) -> HealthState {
    if !check.status {
        return HealthState::Unhealthy;
    }

    if let Some(latency) = check.latency_ms {
        if latency >= DEGRADED_THRESHOLD.as_millis() as u64 {
            return HealthState::Degraded;
        }
    }

    HealthState::Healthy
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::enhance::client::MockModelClientTrait;
    use crate::error::AppError;
    use std::sync::Arc;

    fn check(status: bool, latency_ms: Option<u64>) -> CheckResult {
        CheckResult {
            status,
            latency_ms,
            error: None,
        }
    }

    #[test]
    fn should_be_unhealthy_when_check_fails() {
        assert_eq!(
            determine_health_state(&check(false, Some(10))),
            HealthState::Unhealthy
        );
    }

    #[test]
    fn should_be_degraded_when_slow() {
        assert_eq!(
            determine_health_state(&check(true, Some(2500))),
            HealthState::Degraded
        );
    }

    #[test]
    fn should_be_healthy_when_fast() {
        assert_eq!(
            determine_health_state(&check(true, Some(120))),
            HealthState::Healthy
        );
    }

    #[tokio::test]
    async fn should_cache_model_check() {
        // Arrange
        let mut mock = MockModelClientTrait::new();
        mock.expect_health_check()
            .times(1)
            .returning(|| Ok("ok".to_string()));
        let service = HealthService::new(Arc::new(mock));

        // Act
        let first = service.check_health(0).await;
        let second = service.check_health(3).await;

        // Assert
        assert_eq!(first.status, HealthState::Healthy);
        assert_eq!(second.status, HealthState::Healthy);
        assert_eq!(second.active_sessions, 3);
    }

    #[tokio::test]
    async fn should_report_error_code_when_model_fails() {
        let mut mock = MockModelClientTrait::new();
        mock.expect_health_check()
            .returning(|| Err(AppError::ModelAuthError));
        let service = HealthService::new(Arc::new(mock));

        let status = service.check_health(0).await;

        assert_eq!(status.status, HealthState::Unhealthy);
        assert_eq!(status.checks.model_api.error.as_deref(), Some("MODEL_001"));
    }

    #[tokio::test]
    async fn should_report_timeout_from_client_as_unhealthy() {
        let mut mock = MockModelClientTrait::new();
        mock.expect_health_check()
            .times(1)
            .returning(|| Err(AppError::ModelTemporaryError));
        let service = HealthService::new(Arc::new(mock));

        let status = service.check_health(0).await;

        assert_eq!(status.status, HealthState::Unhealthy);
        assert_eq!(status.checks.model_api.error.as_deref(), Some("MODEL_003"));
        assert!(status.checks.model_api.latency_ms.is_some());
    }
}
