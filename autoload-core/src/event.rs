//! Storage object lifecycle events carried in notification attributes.
//!
//! The storage service describes what happened to an object through three
//! attributes on the push message. Only a finalize (object write completed
//! and durably readable) triggers a load; everything else is acknowledged
//! and dropped.

use crate::notification::PushMessage;

pub const ATTR_BUCKET_ID: &str = "bucketId";
pub const ATTR_OBJECT_ID: &str = "objectId";
pub const ATTR_EVENT_TYPE: &str = "eventType";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageEventKind {
    /// Object write completed; the object is durably readable.
    Finalize,
    Delete,
    Archive,
    MetadataUpdate,
    /// Anything else, including an absent `eventType` attribute.
    Unrecognized,
}

fn classify_event_type(event_type: &str) -> StorageEventKind {
    match event_type {
        "OBJECT_FINALIZE" => StorageEventKind::Finalize,
        "OBJECT_DELETE" => StorageEventKind::Delete,
        "OBJECT_ARCHIVE" => StorageEventKind::Archive,
        "OBJECT_METADATA_UPDATE" => StorageEventKind::MetadataUpdate,
        _ => StorageEventKind::Unrecognized,
    }
}

/// Object lifecycle event extracted from a push message.
///
/// Missing attributes come through as empty strings; no validation happens
/// here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub kind: StorageEventKind,
    pub bucket: String,
    pub object: String,
}

impl StorageEvent {
    pub fn from_message(message: &PushMessage) -> Self {
        StorageEvent {
            kind: classify_event_type(message.attribute(ATTR_EVENT_TYPE)),
            bucket: message.attribute(ATTR_BUCKET_ID).to_string(),
            object: message.attribute(ATTR_OBJECT_ID).to_string(),
        }
    }
}
