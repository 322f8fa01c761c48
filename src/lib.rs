pub mod config;
pub mod console;
pub mod domain;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod rate_limit;
pub mod response;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use domain::enhance::{
    ChatCompletionClient, EnhanceService, Modality, ModelClient, ModelClientTrait, RetryPolicy,
};
pub use domain::health::HealthService;
pub use domain::session::SessionStore;
pub use error::AppError;

/// 테스트용 세션 유효 시간
const TEST_SESSION_TTL: Duration = Duration::from_secs(3600);

/// 핸들러가 공유하는 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    pub enhance_service: Arc<EnhanceService>,
    pub sessions: SessionStore,
    pub health: Arc<HealthService>,
}

impl AppState {
    pub fn new(client: ModelClient, retry_policy: RetryPolicy, session_ttl: Duration) -> Self {
        Self {
            enhance_service: Arc::new(EnhanceService::new(client.clone(), retry_policy)),
            sessions: SessionStore::new(session_ttl),
            health: Arc::new(HealthService::new(client)),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        domain::health::handler::health_check,
        domain::enhance::handler::enhance_prompt,
        domain::session::handler::create_session,
        domain::session::handler::get_session,
        domain::session::handler::delete_session,
        domain::session::handler::enhance_in_session,
        domain::session::handler::handle_feedback,
    ),
    components(
        schemas(
            domain::enhance::dto::EnhanceRequest,
            domain::enhance::dto::EnhanceResponse,
            domain::enhance::dto::EnhanceSuccessResponse,
            domain::session::dto::SessionEnhanceRequest,
            domain::session::dto::SessionView,
            domain::session::dto::StepKind,
            domain::session::dto::StepAction,
            domain::session::dto::StepResponse,
            domain::session::dto::StepSuccessResponse,
            domain::session::dto::SessionSuccessResponse,
            domain::session::state::FeedbackEvent,
            domain::health::dto::HealthStatus,
            domain::health::dto::HealthState,
            domain::health::dto::HealthChecks,
            domain::health::dto::CheckResult,
            response::ErrorResponse,
        )
    ),
    tags(
        (name = "Enhance", description = "프롬프트 강화 API"),
        (name = "Session", description = "대화형 세션 API"),
        (name = "Health", description = "상태 확인 API")
    )
)]
pub struct ApiDoc;

/// 모델 API를 호출하는 `/api` 라우트
fn api_routes() -> Router<AppState> {
    use domain::enhance::handler::enhance_prompt;
    use domain::session::handler::{
        create_session, delete_session, enhance_in_session, get_session, handle_feedback,
    };

    Router::new()
        .route("/api/enhance", post(enhance_prompt))
        .route("/api/sessions", post(create_session))
        .route(
            "/api/sessions/:session_id",
            get(get_session).delete(delete_session),
        )
        .route("/api/sessions/:session_id/enhance", post(enhance_in_session))
        .route("/api/sessions/:session_id/events", post(handle_feedback))
}

/// 공통 라우트와 레이어를 붙여 최종 라우터 구성
fn assemble(api: Router<AppState>, extra: Router<AppState>, state: AppState) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(domain::health::handler::health_check))
        .merge(api)
        .merge(extra)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(middleware::request_id_middleware)),
        )
        .with_state(state)
}

/// 운영용 라우터 생성
///
/// `/api` 라우트에 IP 기반 Rate Limiter를 적용하고, Prometheus 핸들이 있으면 `/metrics`를 노출합니다.
/// Rate Limiter는 접속 IP가 필요하므로 `into_make_service_with_connect_info`로 서빙해야 합니다.
pub fn create_router(
    state: AppState,
    metrics: Option<PrometheusHandle>,
) -> Result<Router, AppError> {
    let api = api_routes().layer(rate_limit::create_api_rate_limiter()?);

    let extra = match metrics {
        Some(handle) => Router::new().route("/metrics", get(move || async move { handle.render() })),
        None => Router::new(),
    };

    Ok(assemble(api, extra, state))
}

/// 테스트용 라우터 생성 (Mock 모델 클라이언트 주입)
///
/// Rate Limiter 없이, 빠른 재시도 정책으로 구성합니다.
pub fn create_test_router_with_mock(mock: impl ModelClientTrait + 'static) -> Router {
    let client: ModelClient = Arc::new(mock);
    let state = AppState::new(client, RetryPolicy::fast(), TEST_SESSION_TTL);

    assemble(api_routes(), Router::new(), state)
}
