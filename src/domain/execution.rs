//! Execution request and response records.

/// Parameters for a single start-execution call against the orchestration
/// backend. Exactly one is produced per successfully classified event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRequest {
    /// Target state machine ARN
    pub state_machine_arn: String,
    /// JSON-encoded execution input
    pub input: String,
    /// Execution name; the run guid, used by the backend as a dedup key
    pub name: String,
}

/// Descriptor returned by the backend for a started execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionHandle {
    pub execution_arn: String,
    /// Start time as seconds since the epoch
    pub started_at: i64,
}
