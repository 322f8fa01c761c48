use std::env;
use std::time::Duration;

/// 기본 모델 API 엔드포인트 (Gemini OpenAI 호환 API)
pub const DEFAULT_MODEL_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// 기본 모델 이름
pub const DEFAULT_MODEL_NAME: &str = "gemini-2.0-flash";

/// 애플리케이션 설정
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,

    // Model API
    pub model_api_key: String,
    pub model_api_base: String,
    pub model_name: String,
    pub model_timeout: Duration,
    pub retry_max_elapsed: Duration,

    // Session
    pub session_ttl: Duration,
}

impl AppConfig {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정 로드
    ///
    /// 테스트에서는 프로세스 환경 변수를 건드리지 않고 맵으로 값을 주입합니다.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // `api`는 초기 버전의 .env 키 이름
        let model_api_key = lookup("GEMINI_API_KEY")
            .or_else(|| lookup("api"))
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let server_host = lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let server_port = lookup("SERVER_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let model_api_base =
            lookup("MODEL_API_BASE").unwrap_or_else(|| DEFAULT_MODEL_API_BASE.to_string());
        let model_name = lookup("MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string());

        let model_timeout = parse_secs(&lookup, "MODEL_TIMEOUT_SECS", 25)?;
        let retry_max_elapsed = parse_secs(&lookup, "RETRY_MAX_ELAPSED_SECS", 30)?;
        let session_ttl = parse_secs(&lookup, "SESSION_TTL_SECS", 3600)?;

        Ok(Self {
            server_host,
            server_port,
            model_api_key,
            model_api_base,
            model_name,
            model_timeout,
            retry_max_elapsed,
            session_ttl,
        })
    }
}

fn parse_secs<F>(lookup: &F, key: &'static str, default: u64) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| ConfigError::InvalidDuration(key)),
        None => Ok(Duration::from_secs(default)),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY environment variable is required")]
    MissingApiKey,
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Invalid duration for {0}: expected whole seconds")]
    InvalidDuration(&'static str),
}
