//! 콘솔에서 프롬프트 하나를 강화합니다.

use std::process::ExitCode;
use std::sync::Arc;

use prompt_alchemist::{
    config::AppConfig, console, logging, ChatCompletionClient, EnhanceService, ModelClient,
    RetryPolicy,
};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    logging::init_console_logging();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let client: ModelClient = Arc::new(ChatCompletionClient::from_config(&config));
    let service = EnhanceService::new(client, RetryPolicy::with_max_elapsed(config.retry_max_elapsed));

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    match console::run(&mut input, &mut output, &service).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error_code = e.error_code(), "Enhancement failed");
            eprintln!("Error [{}]: {}", e.error_code(), e);
            ExitCode::FAILURE
        }
    }
}
