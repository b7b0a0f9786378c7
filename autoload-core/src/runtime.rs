//! Trigger runtime shared by every request handler.

use std::sync::Arc;

use autoload_engine::{
    LoadEngine, LoadOptions, LoadRequest, SchemaUpdateOption, SourceRef, TableRef,
    WriteDisposition,
};

use crate::error::TriggerError;
use crate::event::{StorageEvent, StorageEventKind};
use crate::notification::PushEnvelope;

/// Process-wide state: the immutable load destination and the shared engine
/// client handle. Constructed once at startup, shared via `Arc` across
/// concurrent handler invocations.
pub struct Runtime {
    destination: TableRef,
    engine: Arc<dyn LoadEngine>,
}

/// What handling a notification amounted to.
#[derive(Debug)]
pub enum TriggerOutcome {
    /// A finalize event: a load job was submitted and completed cleanly.
    Loaded,
    /// Any other event: acknowledged, no side effect.
    Skipped { event_type: String },
}

impl Runtime {
    pub fn new(destination: TableRef, engine: Arc<dyn LoadEngine>) -> Self {
        Runtime {
            destination,
            engine,
        }
    }

    /// Handle one push notification: load on finalize, skip everything else.
    ///
    /// Blocks until the submitted job reaches a terminal state; bulk loads
    /// can take seconds to minutes and no timeout is applied here.
    pub async fn handle_notification(
        &self,
        envelope: &PushEnvelope,
    ) -> Result<TriggerOutcome, TriggerError> {
        let event = StorageEvent::from_message(&envelope.message);

        if event.kind != StorageEventKind::Finalize {
            let event_type = envelope
                .message
                .attribute(crate::event::ATTR_EVENT_TYPE)
                .to_string();
            tracing::debug!(event_type = %event_type, "ignoring non-finalize storage event");
            return Ok(TriggerOutcome::Skipped { event_type });
        }

        let source = SourceRef::gcs(&event.bucket, &event.object);
        tracing::info!(
            source = %source.uri(),
            destination = %self.destination,
            message_id = %envelope.message.id,
            "object finalized, submitting load job"
        );

        let request = LoadRequest {
            source,
            destination: self.destination.clone(),
            options: LoadOptions {
                write: WriteDisposition::Append,
                schema_update: vec![
                    SchemaUpdateOption::AllowFieldAddition,
                    SchemaUpdateOption::AllowFieldRelaxation,
                ],
            },
        };

        let job = self
            .engine
            .submit_load(request)
            .await
            .map_err(TriggerError::Submission)?;

        let status = job.wait().await.map_err(TriggerError::Wait)?;

        if let Some(error) = status.error() {
            return Err(TriggerError::JobFailed(error.clone()));
        }

        tracing::info!(destination = %self.destination, "load job completed");
        Ok(TriggerOutcome::Loaded)
    }
}
