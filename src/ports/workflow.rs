use crate::domain::execution::{ExecutionHandle, ExecutionRequest};
use async_trait::async_trait;
use std::error::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkflowBackend: Send + Sync {
    /// Start a named workflow execution. The backend treats the execution
    /// name as a natural key; reusing a name for a concurrent run is
    /// rejected there, not here.
    async fn start_execution(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionHandle, Box<dyn Error + Send + Sync>>;
}
