use common::ErrorLocation;

use std::panic::Location;
use std::string::FromUtf8Error;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("Decode Error: {message} {location}")]
    Decode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Encode Error: {message} {location}")]
    Encode {
        message: String,
        location: ErrorLocation,
    },

    #[error("Utf8 Error: {message} {location}")]
    Utf8 {
        message: String,
        location: ErrorLocation,
    },
}

impl From<FromUtf8Error> for CodecError {
    #[track_caller]
    fn from(error: FromUtf8Error) -> Self {
        CodecError::Utf8 {
            message: error.to_string(),
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
