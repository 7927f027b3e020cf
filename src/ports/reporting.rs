use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ErrorReporter: Send + Sync {
    /// Forward a failed invocation (the inbound event and the error it
    /// raised) to the notification channel.
    async fn report(&self, event: &Value, error: &str)
        -> Result<(), Box<dyn Error + Send + Sync>>;
}
