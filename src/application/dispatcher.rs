//! The dispatcher service: classify one inbound event, start the matching
//! workflow execution, emit telemetry.

use crate::application::telemetry::TelemetryContext;
use crate::config::DispatcherConfig;
use crate::domain::event::{classify, decode_object_key, EventKind, WorkflowTrigger};
use crate::domain::execution::{ExecutionHandle, ExecutionRequest};
use crate::error::DispatchError;
use crate::ports::metrics::{MetricUnit, MetricsRecorder};
use crate::ports::reporting::ErrorReporter;
use crate::ports::workflow::WorkflowBackend;
use serde_json::Value;
use uuid::Uuid;

pub struct DispatcherService<B, E, M> {
    config: DispatcherConfig,
    backend: B,
    reporter: E,
    metrics: M,
}

impl<B, E, M> DispatcherService<B, E, M>
where
    B: WorkflowBackend,
    E: ErrorReporter,
    M: MetricsRecorder,
{
    pub fn new(config: DispatcherConfig, backend: B, reporter: E, metrics: M) -> Self {
        Self {
            config,
            backend,
            reporter,
            metrics,
        }
    }

    /// Handle one inbound event. Returns the literal `"success"`, or the
    /// error after it has been reported and logged. No local retry; the
    /// invoking runtime owns retry policy.
    pub async fn handle(&self, event: Value) -> Result<&'static str, DispatchError> {
        let mut context = TelemetryContext::new();

        match self.dispatch(event.clone(), &mut context).await {
            Ok(handle) => {
                context.mark_success(true);
                tracing::info!(
                    context = %context.as_log_fields(),
                    execution_arn = %handle.execution_arn,
                    started_at = handle.started_at,
                    "STATEMACHINE EXECUTION"
                );
                self.metrics.add_dimensions(context.dimensions());
                self.metrics
                    .add_metric("statemachine-execution", MetricUnit::Count, 1.0);
                Ok("success")
            }
            Err(err) => {
                if let Err(report_err) = self.reporter.report(&event, &err.to_string()).await {
                    tracing::error!(error = %report_err, "error reporter failed");
                }
                context.mark_success(false);
                tracing::error!(
                    context = %context.as_log_fields(),
                    error = %err,
                    "Unexpected error occurred"
                );
                Err(err)
            }
        }
    }

    async fn dispatch(
        &self,
        mut event: Value,
        context: &mut TelemetryContext,
    ) -> Result<ExecutionHandle, DispatchError> {
        let request = match classify(&event)? {
            EventKind::StorageTrigger { key } => {
                // Fresh run identifier; doubles as the execution name.
                let guid = Uuid::new_v4().to_string();
                let decoded = decode_object_key(&key)?;
                let trigger = WorkflowTrigger::for_key(&decoded);

                let fields = event.as_object_mut().ok_or_else(|| {
                    DispatchError::InvalidEvent("event is not a JSON object".to_string())
                })?;
                fields.insert("guid".to_string(), Value::String(guid.clone()));
                fields.insert(
                    "workflowTrigger".to_string(),
                    Value::String(trigger.as_str().to_string()),
                );

                context.set("workflowTrigger", trigger.as_str());
                context.set("guid", guid.clone());

                ExecutionRequest {
                    state_machine_arn: self.config.ingest_workflow.clone(),
                    input: event.to_string(),
                    name: guid,
                }
            }
            EventKind::Continuation { guid } => {
                if let Some(trigger) = event.get("workflowTrigger").and_then(Value::as_str) {
                    context.set("workflowTrigger", trigger);
                }
                context.set("guid", guid.clone());

                ExecutionRequest {
                    state_machine_arn: self.config.process_workflow.clone(),
                    // Only the guid travels; the process workflow reloads
                    // state from storage.
                    input: serde_json::json!({ "guid": guid }).to_string(),
                    name: guid,
                }
            }
            EventKind::Callback { guid } => {
                context.set("stateMachineArn", self.config.publish_workflow.clone());
                if let Some(trigger) = event.get("workflowTrigger").and_then(Value::as_str) {
                    context.set("workflowTrigger", trigger);
                }
                context.set("guid", guid.clone());

                ExecutionRequest {
                    state_machine_arn: self.config.publish_workflow.clone(),
                    input: event.to_string(),
                    name: guid,
                }
            }
        };

        self.backend
            .start_execution(&request)
            .await
            .map_err(DispatchError::Backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::metrics::MockMetricsRecorder;
    use crate::ports::reporting::MockErrorReporter;
    use crate::ports::workflow::MockWorkflowBackend;
    use serde_json::json;

    fn config() -> DispatcherConfig {
        DispatcherConfig {
            ingest_workflow: "arn:aws:states:us-east-1:1234:stateMachine:ingest".to_string(),
            process_workflow: "arn:aws:states:us-east-1:1234:stateMachine:process".to_string(),
            publish_workflow: "arn:aws:states:us-east-1:1234:stateMachine:publish".to_string(),
            sns_topic: "arn:aws:sns:us-east-1:1234:errors".to_string(),
            region: None,
            solution_identifier: None,
        }
    }

    fn handle() -> ExecutionHandle {
        ExecutionHandle {
            execution_arn: "arn:aws:states:us-east-1:1234:execution:x:y".to_string(),
            started_at: 1_700_000_000,
        }
    }

    fn success_metrics() -> MockMetricsRecorder {
        let mut metrics = MockMetricsRecorder::new();
        metrics
            .expect_add_dimensions()
            .withf(|dims| dims.get("success").map(String::as_str) == Some("true"))
            .times(1)
            .return_const(());
        metrics
            .expect_add_metric()
            .withf(|name, unit, value| {
                name == "statemachine-execution" && *unit == MetricUnit::Count && *value == 1.0
            })
            .times(1)
            .return_const(());
        metrics
    }

    #[tokio::test]
    async fn storage_event_starts_ingest_with_generated_guid() {
        let mut backend = MockWorkflowBackend::new();
        backend
            .expect_start_execution()
            .withf(|req| {
                let input: Value = serde_json::from_str(&req.input).unwrap();
                req.state_machine_arn.ends_with(":ingest")
                    && input["workflowTrigger"] == "Video"
                    && input["guid"] == req.name.as_str()
                    && Uuid::parse_str(&req.name).is_ok()
            })
            .times(1)
            .returning(|_| Ok(handle()));

        let dispatcher = DispatcherService::new(
            config(),
            backend,
            MockErrorReporter::new(),
            success_metrics(),
        );
        let event = json!({"Records": [{"s3": {"object": {"key": "folder/video.mp4"}}}]});
        assert_eq!(dispatcher.handle(event).await.unwrap(), "success");
    }

    #[tokio::test]
    async fn json_object_key_tags_metadata_trigger() {
        let mut backend = MockWorkflowBackend::new();
        backend
            .expect_start_execution()
            .withf(|req| {
                let input: Value = serde_json::from_str(&req.input).unwrap();
                input["workflowTrigger"] == "Metadata"
            })
            .times(1)
            .returning(|_| Ok(handle()));

        let dispatcher = DispatcherService::new(
            config(),
            backend,
            MockErrorReporter::new(),
            success_metrics(),
        );
        let event = json!({"Records": [{"s3": {"object": {"key": "assets/source.json"}}}]});
        assert_eq!(dispatcher.handle(event).await.unwrap(), "success");
    }

    #[tokio::test]
    async fn continuation_event_sends_guid_only_input() {
        let mut backend = MockWorkflowBackend::new();
        backend
            .expect_start_execution()
            .withf(|req| {
                req.state_machine_arn.ends_with(":process")
                    && req.name == "abc-123"
                    && req.input == r#"{"guid":"abc-123"}"#
            })
            .times(1)
            .returning(|_| Ok(handle()));

        let dispatcher = DispatcherService::new(
            config(),
            backend,
            MockErrorReporter::new(),
            success_metrics(),
        );
        // extra fields on the event must not leak into the input
        let event = json!({"guid": "abc-123", "srcVideo": "video.mp4", "frameCapture": true});
        assert_eq!(dispatcher.handle(event).await.unwrap(), "success");
    }

    #[tokio::test]
    async fn callback_event_uses_nested_guid_as_execution_name() {
        let event = json!({"detail": {"userMetadata": {"guid": "xyz-789"}, "status": "COMPLETE"}});
        let expected_input = event.to_string();

        let mut backend = MockWorkflowBackend::new();
        backend
            .expect_start_execution()
            .withf(move |req| {
                req.state_machine_arn.ends_with(":publish")
                    && req.name == "xyz-789"
                    && req.input == expected_input
            })
            .times(1)
            .returning(|_| Ok(handle()));

        let dispatcher = DispatcherService::new(
            config(),
            backend,
            MockErrorReporter::new(),
            success_metrics(),
        );
        assert_eq!(dispatcher.handle(event).await.unwrap(), "success");
    }

    #[tokio::test]
    async fn invalid_event_fails_without_backend_call() {
        let mut backend = MockWorkflowBackend::new();
        backend.expect_start_execution().never();

        let mut reporter = MockErrorReporter::new();
        reporter
            .expect_report()
            .withf(|event, error| *event == json!({}) && error.contains("invalid event"))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut metrics = MockMetricsRecorder::new();
        metrics.expect_add_dimensions().never();
        metrics.expect_add_metric().never();

        let dispatcher = DispatcherService::new(config(), backend, reporter, metrics);
        let err = dispatcher.handle(json!({})).await.unwrap_err();
        assert!(matches!(err, DispatchError::InvalidEvent(_)));
    }

    #[tokio::test]
    async fn backend_failure_is_reported_once_and_rethrown() {
        let event = json!({"guid": "abc-123"});
        let original = event.clone();

        let mut backend = MockWorkflowBackend::new();
        backend
            .expect_start_execution()
            .times(1)
            .returning(|_| Err("ExecutionAlreadyExists".into()));

        let mut reporter = MockErrorReporter::new();
        reporter
            .expect_report()
            .withf(move |reported, error| {
                *reported == original && error.contains("ExecutionAlreadyExists")
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let mut metrics = MockMetricsRecorder::new();
        metrics.expect_add_dimensions().never();
        metrics.expect_add_metric().never();

        let dispatcher = DispatcherService::new(config(), backend, reporter, metrics);
        let err = dispatcher.handle(event).await.unwrap_err();
        assert!(matches!(err, DispatchError::Backend(_)));
    }

    #[tokio::test]
    async fn reporter_failure_does_not_mask_the_original_error() {
        let mut backend = MockWorkflowBackend::new();
        backend
            .expect_start_execution()
            .times(1)
            .returning(|_| Err("throttled".into()));

        let mut reporter = MockErrorReporter::new();
        reporter
            .expect_report()
            .times(1)
            .returning(|_, _| Err("sns unavailable".into()));

        let mut metrics = MockMetricsRecorder::new();
        metrics.expect_add_metric().never();

        let dispatcher = DispatcherService::new(config(), backend, reporter, metrics);
        let err = dispatcher.handle(json!({"guid": "abc-123"})).await.unwrap_err();
        assert!(matches!(err, DispatchError::Backend(_)));
    }
}
