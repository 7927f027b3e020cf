//! Inbound event classification.
//!
//! Three recognized shapes, detected by presence of a discriminator key and
//! classified up front into a tagged enum. Precedence is fixed: `Records`
//! over `guid` over `detail`. An event satisfying more than one
//! discriminator takes the first branch.

use crate::error::DispatchError;
use serde_json::Value;

/// Classified inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// S3 bucket notification carrying an object key; starts ingest.
    StorageTrigger { key: String },
    /// Continuation call from a prior stage carrying the run guid; starts process.
    Continuation { guid: String },
    /// MediaConvert completion callback carrying a nested run guid; starts publish.
    Callback { guid: String },
}

/// Workflow trigger tag derived from the ingested object's file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowTrigger {
    Metadata,
    Video,
}

impl WorkflowTrigger {
    /// `Metadata` for a `json` extension (case-sensitive), `Video` otherwise.
    pub fn for_key(key: &str) -> Self {
        if extension(key) == "json" {
            WorkflowTrigger::Metadata
        } else {
            WorkflowTrigger::Video
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowTrigger::Metadata => "Metadata",
            WorkflowTrigger::Video => "Video",
        }
    }
}

/// Classify an inbound event by its discriminator key.
///
/// Returns `InvalidEvent` when no discriminator is present, or when a
/// recognized shape is missing the field the variant depends on.
pub fn classify(event: &Value) -> Result<EventKind, DispatchError> {
    if event.get("Records").is_some() {
        let key = event
            .pointer("/Records/0/s3/object/key")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DispatchError::InvalidEvent("Records event missing s3 object key".to_string())
            })?;
        return Ok(EventKind::StorageTrigger {
            key: key.to_string(),
        });
    }

    if let Some(guid) = event.get("guid") {
        let guid = guid.as_str().ok_or_else(|| {
            DispatchError::InvalidEvent("guid field is not a string".to_string())
        })?;
        return Ok(EventKind::Continuation {
            guid: guid.to_string(),
        });
    }

    if event.get("detail").is_some() {
        let guid = event
            .pointer("/detail/userMetadata/guid")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DispatchError::InvalidEvent("detail event missing userMetadata guid".to_string())
            })?;
        return Ok(EventKind::Callback {
            guid: guid.to_string(),
        });
    }

    Err(DispatchError::InvalidEvent(
        "no recognized discriminator key (Records, guid, detail)".to_string(),
    ))
}

/// Decode an S3 object key as delivered in a bucket notification:
/// `+` becomes a space, then percent-escapes are resolved.
pub fn decode_object_key(raw: &str) -> Result<String, DispatchError> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| DispatchError::InvalidEvent(format!("undecodable object key: {}", e)))
}

// Extension after the last dot. Empty when there is no dot or the dot is
// the first character (a dotfile has no extension).
fn extension(key: &str) -> &str {
    match key.rfind('.') {
        Some(i) if i > 0 => &key[i + 1..],
        _ => "",
    }
}
