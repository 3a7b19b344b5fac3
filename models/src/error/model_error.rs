use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ModelError {
    #[error("Unknown Channel Error: {name} {location}")]
    UnknownChannel {
        name: String,
        location: ErrorLocation,
    },
}
