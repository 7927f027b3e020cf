use std::collections::BTreeMap;

/// CloudWatch metric unit, limited to the ones this service emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Count,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Count => "Count",
        }
    }
}

/// Per-invocation metric buffer. Dimensions and values accumulate during
/// handling and are published once by the pipeline's flush stage.
#[cfg_attr(test, mockall::automock)]
pub trait MetricsRecorder: Send + Sync {
    fn add_dimensions(&self, dimensions: &BTreeMap<String, String>);

    fn add_metric(&self, name: &str, unit: MetricUnit, value: f64);

    /// Publish buffered metrics and reset the buffer. A no-op when nothing
    /// was recorded.
    fn flush(&self);
}
