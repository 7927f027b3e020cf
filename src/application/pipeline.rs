//! Instrumentation pipeline around the dispatcher.
//!
//! Cross-cutting stages wrap a plain handler: before hooks run in
//! registration order, after hooks in reverse. The stages carry no
//! business semantics; the last-registered stage is the innermost.

use crate::application::dispatcher::DispatcherService;
use crate::error::DispatchError;
use crate::ports::metrics::{MetricUnit, MetricsRecorder};
use crate::ports::reporting::ErrorReporter;
use crate::ports::workflow::WorkflowBackend;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Instant;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, event: Value) -> Result<&'static str, DispatchError>;
}

#[async_trait]
impl<B, E, M> Handler for DispatcherService<B, E, M>
where
    B: WorkflowBackend,
    E: ErrorReporter,
    M: MetricsRecorder,
{
    async fn handle(&self, event: Value) -> Result<&'static str, DispatchError> {
        DispatcherService::handle(self, event).await
    }
}

/// One wrapping stage with hooks around the core call.
#[async_trait]
pub trait Stage: Send + Sync {
    async fn before(&self, _event: &Value) {}

    async fn after(&self, _outcome: &Result<&'static str, DispatchError>) {}
}

pub struct Pipeline<H> {
    handler: H,
    stages: Vec<Box<dyn Stage>>,
}

impl<H: Handler> Pipeline<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            stages: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub async fn run(&self, event: Value) -> Result<&'static str, DispatchError> {
        for stage in &self.stages {
            stage.before(&event).await;
        }
        let outcome = self.handler.handle(event).await;
        for stage in self.stages.iter().rev() {
            stage.after(&outcome).await;
        }
        outcome
    }
}

/// Logs the inbound event and service identity up front.
pub struct LogContextStage {
    service: String,
    component: String,
}

impl LogContextStage {
    pub fn new(service: &str, component: &str) -> Self {
        Self {
            service: service.to_string(),
            component: component.to_string(),
        }
    }
}

#[async_trait]
impl Stage for LogContextStage {
    async fn before(&self, event: &Value) {
        tracing::info!(
            service = %self.service,
            component = %self.component,
            event = %event,
            "invocation received"
        );
    }
}

/// Records wall-clock time across the handler call.
pub struct TraceStage {
    started: Mutex<Option<Instant>>,
}

impl TraceStage {
    pub fn new() -> Self {
        Self {
            started: Mutex::new(None),
        }
    }
}

impl Default for TraceStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for TraceStage {
    async fn before(&self, _event: &Value) {
        *self.started.lock().unwrap() = Some(Instant::now());
    }

    async fn after(&self, outcome: &Result<&'static str, DispatchError>) {
        let elapsed_ms = self
            .started
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);
        tracing::debug!(elapsed_ms, success = outcome.is_ok(), "handler trace");
    }
}

/// Flushes buffered metrics at invocation exit, tagging the first
/// invocation of the process with a cold-start count.
pub struct MetricsStage<M> {
    metrics: M,
    cold_start: AtomicBool,
}

impl<M: MetricsRecorder> MetricsStage<M> {
    pub fn new(metrics: M) -> Self {
        Self {
            metrics,
            cold_start: AtomicBool::new(true),
        }
    }
}

#[async_trait]
impl<M: MetricsRecorder> Stage for MetricsStage<M> {
    async fn after(&self, _outcome: &Result<&'static str, DispatchError>) {
        if self.cold_start.swap(false, Ordering::Relaxed) {
            self.metrics.add_metric("ColdStart", MetricUnit::Count, 1.0);
        }
        self.metrics.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::metrics::MockMetricsRecorder;
    use serde_json::json;
    use std::sync::Arc;

    struct OkHandler;

    #[async_trait]
    impl Handler for OkHandler {
        async fn handle(&self, _event: Value) -> Result<&'static str, DispatchError> {
            Ok("success")
        }
    }

    struct RecordingStage {
        name: &'static str,
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Stage for RecordingStage {
        async fn before(&self, _event: &Value) {
            self.calls.lock().unwrap().push(format!("{}.before", self.name));
        }

        async fn after(&self, _outcome: &Result<&'static str, DispatchError>) {
            self.calls.lock().unwrap().push(format!("{}.after", self.name));
        }
    }

    #[tokio::test]
    async fn after_hooks_run_in_reverse_registration_order() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new(OkHandler)
            .with_stage(RecordingStage {
                name: "outer",
                calls: calls.clone(),
            })
            .with_stage(RecordingStage {
                name: "inner",
                calls: calls.clone(),
            });

        assert_eq!(pipeline.run(json!({})).await.unwrap(), "success");
        assert_eq!(
            *calls.lock().unwrap(),
            vec!["outer.before", "inner.before", "inner.after", "outer.after"]
        );
    }

    #[tokio::test]
    async fn metrics_stage_flushes_and_emits_cold_start_once() {
        let mut metrics = MockMetricsRecorder::new();
        metrics
            .expect_add_metric()
            .withf(|name, unit, value| {
                name == "ColdStart" && *unit == MetricUnit::Count && *value == 1.0
            })
            .times(1)
            .return_const(());
        metrics.expect_flush().times(2).return_const(());

        let stage = MetricsStage::new(metrics);
        stage.after(&Ok("success")).await;
        stage.after(&Ok("success")).await;
    }

    #[tokio::test]
    async fn metrics_stage_flushes_on_failure_too() {
        let mut metrics = MockMetricsRecorder::new();
        metrics.expect_add_metric().times(1).return_const(());
        metrics.expect_flush().times(1).return_const(());

        let stage = MetricsStage::new(metrics);
        stage
            .after(&Err(DispatchError::InvalidEvent("nope".to_string())))
            .await;
    }
}
