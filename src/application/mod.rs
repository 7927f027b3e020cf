//! Application - Dispatcher service and instrumentation pipeline.

pub mod dispatcher;
pub mod pipeline;
pub mod telemetry;
