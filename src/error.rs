//! Error taxonomy for the dispatcher.

use std::error::Error;
use std::fmt;

/// Errors raised while handling a single inbound event.
///
/// Both variants are fatal to the invocation: the dispatcher logs, reports
/// and rethrows. Retry policy belongs to the invoking runtime.
#[derive(Debug)]
pub enum DispatchError {
    /// The event carried none of the recognized discriminator keys, or a
    /// recognized shape was missing a required field.
    InvalidEvent(String),
    /// The start-execution call against the orchestration backend failed.
    Backend(Box<dyn Error + Send + Sync>),
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::InvalidEvent(msg) => write!(f, "invalid event object: {}", msg),
            DispatchError::Backend(e) => write!(f, "start execution failed: {}", e),
        }
    }
}

impl Error for DispatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DispatchError::InvalidEvent(_) => None,
            DispatchError::Backend(e) => Some(e.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_the_cause() {
        let invalid = DispatchError::InvalidEvent("no discriminator".to_string());
        assert_eq!(
            invalid.to_string(),
            "invalid event object: no discriminator"
        );
        assert!(invalid.source().is_none());

        let backend = DispatchError::Backend("ExecutionAlreadyExists".into());
        assert_eq!(
            backend.to_string(),
            "start execution failed: ExecutionAlreadyExists"
        );
        assert!(backend.source().is_some());
    }
}
