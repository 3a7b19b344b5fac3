//! Transport seam between the session and the socket primitive.
//!
//! A [`Connector`] opens a [`Transport`] synchronously and reports how the
//! attempt went through [`TransportEvent`]s, in the order a browser socket
//! would: `Opened`, any number of `Frame`s, then optionally `Error` followed
//! by `Closed`. The session owns the `Transport`; whatever drives the socket
//! holds the matching [`TransportPeer`].
//!
//! Dropping the `Transport` closes the connection. Events the peer emits after
//! that are discarded, which is how the session suppresses close handling for
//! a transport it replaced or shut down itself.

pub mod ws;

pub use ws::WsConnector;

use crate::error::transport::TransportError;

use common::ErrorLocation;

use std::panic::Location;

use tokio::sync::mpsc;
use url::Url;

/// A frame received from the gateway, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    Text(String),
    Binary(Vec<u8>),
}

/// Lifecycle and data notifications from one transport instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Opened,
    Frame(InboundFrame),
    /// Always followed by `Closed`.
    Error(String),
    Closed,
}

/// Opens transports to the gateway.
pub trait Connector: Send + 'static {
    fn open(&self, url: &Url) -> Transport;
}

/// Session-side end of one connection epoch.
#[derive(Debug)]
pub struct Transport {
    outbound: mpsc::UnboundedSender<String>,
    events: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Socket-side end of one connection epoch.
#[derive(Debug)]
pub struct TransportPeer {
    events: mpsc::UnboundedSender<TransportEvent>,
    outbound: mpsc::UnboundedReceiver<String>,
}

/// Create a connected `Transport`/`TransportPeer` pair.
pub fn pair() -> (Transport, TransportPeer) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    (
        Transport {
            outbound: outbound_tx,
            events: events_rx,
        },
        TransportPeer {
            events: events_tx,
            outbound: outbound_rx,
        },
    )
}

impl Transport {
    /// Queue a text frame for the socket.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Send`] if the socket side has already gone away.
    pub fn send(&self, text: String) -> Result<(), TransportError> {
        self.outbound.send(text).map_err(|e| TransportError::Send {
            message: format!("Transport peer is gone, dropped frame: {}", e.0),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// Next event from the socket. `None` means the peer vanished without
    /// reporting `Closed`; treat it as a close.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }

    /// Close the connection without observing any further events.
    pub fn close(self) {
        drop(self);
    }
}

impl TransportPeer {
    /// Report an event to the session. Returns `false` once the session has
    /// dropped its end.
    pub fn emit(&self, event: TransportEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Next frame the session wants written. `None` means the session closed
    /// the transport.
    pub async fn next_outbound(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Everything the session has queued so far, without waiting.
    pub fn drain_outbound(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.outbound.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// True once the session dropped its end of this transport.
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}
