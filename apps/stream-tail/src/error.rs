use session_core::CoreError;
use session_core::error::session::SessionError;

use common::ErrorLocation;

use std::panic::Location;

use thiserror::Error;

/// Errors that end a `stream-tail` run.
#[derive(Debug, Error)]
pub enum StreamTailError {
    /// Startup or shutdown failure in the tool itself
    #[error("Stream Tail Error: {message} {location}")]
    StreamTail {
        message: String,
        location: ErrorLocation,
    },

    /// Error from session-core while assembling config
    #[error("Core Error: {message} {location}")]
    Core {
        message: String,
        location: ErrorLocation,
    },

    /// The session could not be started or stopped
    #[error("Session Error: {message} {location}")]
    Session {
        message: String,
        location: ErrorLocation,
    },

    /// Automatic reconnects were exhausted
    #[error("Gave Up Error: {message} {location}")]
    GaveUp {
        message: String,
        location: ErrorLocation,
    },
}

impl From<CoreError> for StreamTailError {
    #[track_caller]
    fn from(error: CoreError) -> Self {
        StreamTailError::Core {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<SessionError> for StreamTailError {
    #[track_caller]
    fn from(error: SessionError) -> Self {
        StreamTailError::Session {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
