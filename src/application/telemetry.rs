//! Per-invocation telemetry context.

use serde_json::Value;
use std::collections::BTreeMap;

/// Accumulating map of telemetry dimensions (`workflowTrigger`, `guid`,
/// `success`, ...). Built during handling, emitted once as log fields and
/// metric dimensions, then discarded with the invocation.
#[derive(Debug, Clone, Default)]
pub struct TelemetryContext {
    dimensions: BTreeMap<String, String>,
}

impl TelemetryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.dimensions.insert(name.to_string(), value.into());
    }

    pub fn mark_success(&mut self, success: bool) {
        self.set("success", if success { "true" } else { "false" });
    }

    pub fn dimensions(&self) -> &BTreeMap<String, String> {
        &self.dimensions
    }

    /// JSON object form, for structured log fields.
    pub fn as_log_fields(&self) -> Value {
        Value::Object(
            self.dimensions
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }
}
