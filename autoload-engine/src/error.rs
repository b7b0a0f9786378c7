/// Failure talking to the load engine: submission rejected, transport broken,
/// or a response we could not make sense of.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("engine transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("engine rejected request ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("engine response carried no job reference")]
    MissingJobReference,
    #[error("{0}")]
    Internal(String),
}

/// Error embedded in a terminal job status. The job ran and failed, e.g. a
/// malformed record, a schema conflict beyond the allowed relaxations, or a
/// missing source object.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{reason}: {message}")]
pub struct JobError {
    pub reason: String,
    pub message: String,
}
