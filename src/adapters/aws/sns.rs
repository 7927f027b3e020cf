use crate::ports::reporting::ErrorReporter;
use async_trait::async_trait;
use aws_sdk_sns::Client;
use serde_json::Value;
use std::error::Error;

/// SnsReporter implements ErrorReporter for AWS SNS.
#[derive(Clone)]
pub struct SnsReporter {
    client: Client,
    topic_arn: String,
}

impl SnsReporter {
    pub fn new(client: Client, topic_arn: String) -> Self {
        Self { client, topic_arn }
    }
}

#[async_trait]
impl ErrorReporter for SnsReporter {
    async fn report(
        &self,
        event: &Value,
        error: &str,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let message = serde_json::to_string_pretty(&serde_json::json!({
            "error": error,
            "event": event,
        }))?;

        self.client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject("Workflow dispatch error")
            .message(message)
            .send()
            .await?;
        Ok(())
    }
}
