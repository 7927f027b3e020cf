pub mod sns;
pub mod step_functions;
