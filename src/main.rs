use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusBuilder;
use prompt_alchemist::{
    config::AppConfig, create_router, logging, shutdown::shutdown_signal, AppState,
    ChatCompletionClient, ModelClient, RetryPolicy,
};

#[tokio::main]
async fn main() -> ExitCode {
    // 1. 환경변수 로드
    dotenvy::dotenv().ok();

    // 2. 로깅 초기화 (guard는 종료 시까지 유지)
    let _guard = logging::init_server_logging();

    // 3. 설정 로드
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    // 4. 메트릭 레코더 설치
    let metrics_handle = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to install Prometheus recorder, /metrics disabled");
            None
        }
    };

    // 5. 애플리케이션 상태 및 라우터 구성
    let client: ModelClient = Arc::new(ChatCompletionClient::from_config(&config));
    let state = AppState::new(
        client,
        RetryPolicy::with_max_elapsed(config.retry_max_elapsed),
        config.session_ttl,
    );

    let app = match create_router(state, metrics_handle) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build router");
            return ExitCode::FAILURE;
        }
    };

    // 6. 서버 실행
    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, addr = %addr, "Failed to bind address");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        addr = %addr,
        model = %config.model_name,
        "Server listening"
    );

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        tracing::error!(error = %e, "Server error");
        return ExitCode::FAILURE;
    }

    tracing::info!("Server shut down");
    ExitCode::SUCCESS
}
