pub mod codec;
pub mod config;
pub mod error;
pub mod heartbeat;
pub mod reconnect;
pub mod session;
pub mod subscription;
pub mod transport;

#[cfg(test)]
mod tests;

pub use config::SessionConfig;
pub use error::CoreError;
pub use session::{ConnectionManager, EventHandler};

pub use models::{Channel, ConnectionStatus, SessionSnapshot};

/// Default gateway origin when neither config nor environment provides one.
pub const DEFAULT_GATEWAY_ORIGIN: &str = "http://127.0.0.1:8080";
/// Path of the streaming endpoint below the gateway origin.
pub const DEFAULT_GATEWAY_PATH: &str = "/ws";
