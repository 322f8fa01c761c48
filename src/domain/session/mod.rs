pub mod dto;
pub mod handler;
pub mod shell;
pub mod state;
pub mod store;

pub use shell::{process_step, StepOutcome, Submission};
pub use state::{FeedbackEvent, SessionState};
pub use store::SessionStore;
