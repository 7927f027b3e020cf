//! Configuration for the dispatcher deployment.

use std::env;

/// Configuration loaded from the hosting environment.
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// State machine ARN for the ingest workflow (S3-triggered)
    pub ingest_workflow: String,
    /// State machine ARN for the process workflow (continuation)
    pub process_workflow: String,
    /// State machine ARN for the publish workflow (MediaConvert callback)
    pub publish_workflow: String,
    /// SNS topic ARN for error notifications
    pub sns_topic: String,
    /// AWS region override; falls back to the SDK default chain when unset
    pub region: Option<String>,
    /// Solution identifier attached to outbound SDK calls as the app name
    pub solution_identifier: Option<String>,
}

impl DispatcherConfig {
    /// Load configuration from environment variables.
    /// Panics if required variables are not set.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            ingest_workflow: env::var("IngestWorkflow").expect("IngestWorkflow env var required"),
            process_workflow: env::var("ProcessWorkflow")
                .expect("ProcessWorkflow env var required"),
            publish_workflow: env::var("PublishWorkflow")
                .expect("PublishWorkflow env var required"),
            sns_topic: env::var("SnsTopic").expect("SnsTopic env var required"),
            region: env::var("AWS_REGION").ok(),
            solution_identifier: env::var("SOLUTION_IDENTIFIER").ok(),
        }
    }
}
