pub mod client;
pub mod dto;
pub mod handler;
pub mod modality;
pub mod prompt;
pub mod retry;
pub mod service;

pub use client::{ChatCompletionClient, ModelClient, ModelClientTrait};
pub use modality::Modality;
pub use retry::RetryPolicy;
pub use service::EnhanceService;
