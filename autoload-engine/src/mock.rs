//! In-process [`LoadEngine`] substitute for tests.
//!
//! Records every accepted submission and resolves jobs with a canned
//! outcome, so callers can be exercised without contacting a real engine.

use parking_lot::Mutex;

use crate::{EngineError, JobError, JobStatus, LoadEngine, LoadJob, LoadRequest};

/// How the next submitted job behaves.
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Submission accepted, job completes cleanly.
    Complete,
    /// Submission accepted, job completes with an embedded execution error.
    CompleteWithJobError(JobError),
    /// Submission itself is rejected.
    RejectSubmission(String),
    /// Submission accepted, waiting on the job fails.
    FailWait(String),
}

#[derive(Default)]
pub struct MockEngine {
    submissions: Mutex<Vec<LoadRequest>>,
    outcome: Mutex<Option<MockOutcome>>,
}

impl MockEngine {
    pub fn new() -> Self {
        MockEngine::default()
    }

    pub fn with_outcome(outcome: MockOutcome) -> Self {
        MockEngine {
            submissions: Mutex::new(Vec::new()),
            outcome: Mutex::new(Some(outcome)),
        }
    }

    /// Every request accepted so far, in submission order.
    pub fn submissions(&self) -> Vec<LoadRequest> {
        self.submissions.lock().clone()
    }

    fn current_outcome(&self) -> MockOutcome {
        self.outcome.lock().clone().unwrap_or(MockOutcome::Complete)
    }
}

#[async_trait::async_trait]
impl LoadEngine for MockEngine {
    async fn submit_load(&self, request: LoadRequest) -> Result<Box<dyn LoadJob>, EngineError> {
        let outcome = self.current_outcome();
        if let MockOutcome::RejectSubmission(message) = outcome {
            return Err(EngineError::Internal(message));
        }

        self.submissions.lock().push(request);
        Ok(Box::new(MockJob { outcome }))
    }
}

struct MockJob {
    outcome: MockOutcome,
}

#[async_trait::async_trait]
impl LoadJob for MockJob {
    async fn wait(self: Box<Self>) -> Result<JobStatus, EngineError> {
        match self.outcome {
            MockOutcome::Complete | MockOutcome::RejectSubmission(_) => Ok(JobStatus::done()),
            MockOutcome::CompleteWithJobError(error) => Ok(JobStatus::done_with_error(error)),
            MockOutcome::FailWait(message) => Err(EngineError::Internal(message)),
        }
    }
}
