//! Stagehand - VOD Workflow Dispatcher
//!
//! Hexagonal Architecture:
//! - domain/: Pure classification logic (event shapes, execution requests)
//! - ports/: Trait definitions (workflow backend, error reporting, metrics)
//! - adapters/: Concrete implementations (Step Functions, SNS, EMF)
//! - application/: Dispatcher service and instrumentation pipeline
//! - config: Environment configuration
//!
//! One inbound event per invocation: an S3 bucket notification, a workflow
//! continuation, or a MediaConvert completion callback. The dispatcher
//! classifies the event, starts the matching Step Functions execution, and
//! emits structured telemetry about the outcome.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;

// Re-exports for convenience
pub use application::dispatcher::DispatcherService;
pub use application::pipeline::{Handler, Pipeline};
pub use config::DispatcherConfig;
pub use error::DispatchError;
