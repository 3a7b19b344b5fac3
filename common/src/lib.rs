//! Shared building blocks for the channel stream workspace.
//!
//! Everything here is dependency-light so both `models` and `session-core`
//! can use it without pulling in the async stack.

pub mod error;

pub use error::error_location::ErrorLocation;
