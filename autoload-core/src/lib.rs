pub mod error;
pub mod event;
pub mod notification;
pub mod runtime;

pub use error::TriggerError;
pub use notification::PushEnvelope;
pub use runtime::{Runtime, TriggerOutcome};
