pub mod core;
pub mod state;

pub use self::core::SubmissionOrchestrator;
pub use state::SubmissionState;
