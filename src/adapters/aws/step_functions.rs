use crate::domain::execution::{ExecutionHandle, ExecutionRequest};
use crate::ports::workflow::WorkflowBackend;
use async_trait::async_trait;
use aws_sdk_sfn::Client;
use std::error::Error;

/// StepFunctionsAdapter implements WorkflowBackend for AWS Step Functions.
#[derive(Clone)]
pub struct StepFunctionsAdapter {
    client: Client,
}

impl StepFunctionsAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WorkflowBackend for StepFunctionsAdapter {
    async fn start_execution(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionHandle, Box<dyn Error + Send + Sync>> {
        let resp = self
            .client
            .start_execution()
            .state_machine_arn(&request.state_machine_arn)
            .input(&request.input)
            .name(&request.name)
            .send()
            .await?;

        Ok(ExecutionHandle {
            execution_arn: resp.execution_arn().to_string(),
            started_at: resp.start_date().secs(),
        })
    }
}
