//! Push notification envelope.
//!
//! Wire format of the push transport: a `message` with an id, optional
//! base64-encoded payload, and string attributes, plus the subscription name.
//! Absent fields decode to their empty values; only the attributes carry
//! business meaning here.

use std::collections::HashMap;

use base64::Engine as _;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Default, Deserialize)]
pub struct PushEnvelope {
    #[serde(default)]
    pub message: PushMessage,
    #[serde(default)]
    pub subscription: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PushMessage {
    /// Opaque payload, already base64-decoded. Unused by the trigger; the
    /// attributes carry everything it needs.
    #[serde(default, deserialize_with = "base64_bytes")]
    pub data: Option<Vec<u8>>,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl PushMessage {
    /// Attribute value, or `""` when the key is absent.
    pub fn attribute(&self, key: &str) -> &str {
        self.attributes.get(key).map(String::as_str).unwrap_or("")
    }
}

fn base64_bytes<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        Some(encoded) => base64::engine::general_purpose::STANDARD
            .decode(encoded.as_bytes())
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
