//! Ports - Trait definitions for external collaborators.

pub mod metrics;
pub mod reporting;
pub mod workflow;
