//! 콘솔 실행 흐름
//!
//! 프롬프트와 대상 모델을 한 줄씩 읽고, 강화 결과를 한 번 출력합니다.

use std::io::{BufRead, Write};

use crate::domain::enhance::{EnhanceService, Modality};
use crate::error::AppError;

const PROMPT_QUESTION: &str = "Enter your prompt: ";
const TARGET_QUESTION: &str = "Target model (text/image/video/code): ";

/// 콘솔 한 번 실행
///
/// 출력한 강화 결과를 그대로 반환합니다.
pub async fn run<R, W>(
    input: &mut R,
    output: &mut W,
    service: &EnhanceService,
) -> Result<String, AppError>
where
    R: BufRead,
    W: Write,
{
    let user_prompt = ask(input, output, PROMPT_QUESTION)?;
    let target = Modality::parse(&ask(input, output, TARGET_QUESTION)?);

    let enhanced = service.enhance(&user_prompt, &target).await?;

    writeln!(output, "\nStructured Prompt:\n{}", enhanced).map_err(write_failed)?;
    output.flush().map_err(write_failed)?;

    Ok(enhanced)
}

/// 질문을 출력하고 한 줄을 읽어 줄바꿈을 제거해 반환
fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<String, AppError> {
    write!(output, "{}", question).map_err(write_failed)?;
    output.flush().map_err(write_failed)?;

    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .map_err(|e| AppError::InputClosed(e.to_string()))?;

    if read == 0 {
        return Err(AppError::InputClosed("EOF".to_string()));
    }

    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn write_failed(e: std::io::Error) -> AppError {
    AppError::Internal(format!("stdout write failed: {}", e))
}
