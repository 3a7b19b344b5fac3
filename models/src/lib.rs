//! Wire and state models for the channel stream session.
//!
//! Pure data: channels, connection status, the JSON envelopes exchanged with
//! the gateway, and the snapshot the session publishes to callers. Behavior
//! lives in `session-core`.

pub mod channel;
pub mod envelope;
pub mod error;
pub mod snapshot;
pub mod status;

pub use channel::Channel;
pub use envelope::{AckAction, ClientEnvelope, ServerEnvelope};
pub use error::model_error::ModelError;
pub use snapshot::SessionSnapshot;
pub use status::ConnectionStatus;

#[cfg(test)]
mod tests;
