use autoload_engine::{EngineError, JobError};

/// Failure while turning a finalize event into a completed load.
///
/// Each variant marks the step that broke; nothing after the failing step
/// runs. None of these are retried, none are fatal to the process.
#[derive(Debug, thiserror::Error)]
pub enum TriggerError {
    #[error("load submission failed: {0}")]
    Submission(EngineError),
    #[error("waiting for load job failed: {0}")]
    Wait(EngineError),
    #[error("load job failed: {0}")]
    JobFailed(JobError),
}
