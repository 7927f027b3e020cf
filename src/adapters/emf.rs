//! CloudWatch Embedded Metric Format recorder.
//!
//! Buffers dimensions and metric values for one invocation and publishes
//! them as a single EMF document on stdout, where the hosting runtime's
//! log pipeline picks it up.

use crate::ports::metrics::{MetricUnit, MetricsRecorder};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Default)]
struct Buffer {
    dimensions: BTreeMap<String, String>,
    metrics: Vec<(String, MetricUnit, f64)>,
}

/// EmfMetrics implements MetricsRecorder as an EMF emitter. Clones share
/// one buffer, so the dispatcher and the flush stage see the same state.
#[derive(Clone)]
pub struct EmfMetrics {
    namespace: String,
    defaults: BTreeMap<String, String>,
    buffer: Arc<Mutex<Buffer>>,
}

impl EmfMetrics {
    pub fn new(namespace: &str, service: &str, component: &str) -> Self {
        let mut defaults = BTreeMap::new();
        defaults.insert("service".to_string(), service.to_string());
        defaults.insert("component".to_string(), component.to_string());

        let buffer = Buffer {
            dimensions: defaults.clone(),
            metrics: Vec::new(),
        };

        Self {
            namespace: namespace.to_string(),
            defaults,
            buffer: Arc::new(Mutex::new(buffer)),
        }
    }

    fn render(&self, buffer: &Buffer, timestamp_ms: u64) -> Value {
        let metric_defs: Vec<Value> = buffer
            .metrics
            .iter()
            .map(|(name, unit, _)| json!({ "Name": name, "Unit": unit.as_str() }))
            .collect();
        let dimension_keys: Vec<&String> = buffer.dimensions.keys().collect();

        let mut root = serde_json::Map::new();
        root.insert(
            "_aws".to_string(),
            json!({
                "Timestamp": timestamp_ms,
                "CloudWatchMetrics": [{
                    "Namespace": self.namespace,
                    "Dimensions": [dimension_keys],
                    "Metrics": metric_defs,
                }],
            }),
        );
        for (name, value) in &buffer.dimensions {
            root.insert(name.clone(), Value::String(value.clone()));
        }
        for (name, _, value) in &buffer.metrics {
            root.insert(name.clone(), json!(value));
        }
        Value::Object(root)
    }
}

impl MetricsRecorder for EmfMetrics {
    fn add_dimensions(&self, dimensions: &BTreeMap<String, String>) {
        let mut buffer = self.buffer.lock().unwrap();
        for (name, value) in dimensions {
            buffer.dimensions.insert(name.clone(), value.clone());
        }
    }

    fn add_metric(&self, name: &str, unit: MetricUnit, value: f64) {
        let mut buffer = self.buffer.lock().unwrap();
        buffer.metrics.push((name.to_string(), unit, value));
    }

    fn flush(&self) {
        let mut buffer = self.buffer.lock().unwrap();
        if !buffer.metrics.is_empty() {
            let timestamp_ms = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            println!("{}", self.render(&buffer, timestamp_ms));
        }
        buffer.metrics.clear();
        buffer.dimensions = self.defaults.clone();
    }
}
