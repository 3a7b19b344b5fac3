use crate::error::model_error::ModelError;

use common::ErrorLocation;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::panic::Location;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named subdivision of the event stream.
///
/// The set is closed and shared with the gateway; a frame naming any other
/// channel does not decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Chat,
    Orchestrator,
    Workers,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Chat, Channel::Orchestrator, Channel::Workers];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Chat => "chat",
            Channel::Orchestrator => "orchestrator",
            Channel::Workers => "workers",
        }
    }
}

impl Display for Channel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = ModelError;

    #[track_caller]
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|channel| channel.as_str() == name)
            .ok_or_else(|| ModelError::UnknownChannel {
                name: name.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
