//! 로깅 초기화 모듈
//!
//! 서버는 JSON 형식의 구조화된 로그를 stdout과 일별 로그 파일에 동시 출력합니다.
//! 콘솔 실행은 결과 출력과 섞이지 않도록 stderr에만 간단한 형식으로 출력합니다.

use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const SERVER_DEFAULT_FILTER: &str = "info,prompt_alchemist=debug";
const CONSOLE_DEFAULT_FILTER: &str = "warn";

/// 서버용 로깅 초기화
///
/// 환경 변수 `RUST_LOG`로 로그 레벨을, `LOG_DIR`로 로그 디렉토리를 설정할 수 있습니다.
/// 파일명 형식: `prompt-alchemist.log.YYYY-MM-DD`
///
/// 반환되는 `WorkerGuard`를 main에서 유지해야 프로세스 종료 시 버퍼링된 로그가 손실되지 않습니다.
pub fn init_server_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

    let file_appender = rolling::daily(&log_dir, "prompt-alchemist.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let stdout_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .flatten_event(false);

    let file_layer = fmt::layer()
        .json()
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .with_current_span(true)
        .flatten_event(false)
        .with_ansi(false)
        .with_writer(non_blocking);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(SERVER_DEFAULT_FILTER));

    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
    {
        eprintln!("Failed to initialize tracing: {}", err);
    }

    guard
}

/// 콘솔 실행용 로깅 초기화 (stderr)
pub fn init_console_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(CONSOLE_DEFAULT_FILTER));

    let stderr_layer = fmt::layer()
        .compact()
        .with_target(false)
        .with_writer(std::io::stderr);

    if let Err(err) = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init()
    {
        eprintln!("Failed to initialize tracing: {}", err);
    }
}
