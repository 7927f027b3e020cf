//! Domain - Pure event classification and execution planning.

pub mod event;
pub mod execution;
