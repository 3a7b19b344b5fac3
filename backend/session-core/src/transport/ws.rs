//! tokio-tungstenite implementation of the transport seam.

use crate::transport::{Connector, InboundFrame, Transport, TransportEvent, TransportPeer, pair};

use futures_util::{SinkExt, StreamExt};
use log::{debug, trace, warn};
use tokio::spawn as TokioSpawn;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Opens WebSocket connections to the gateway.
///
/// Each `open` spawns one task that owns the socket for the lifetime of the
/// epoch. Must be called from within a tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    fn open(&self, url: &Url) -> Transport {
        let (transport, peer) = pair();
        TokioSpawn(run_socket(url.to_string(), peer));
        transport
    }
}

async fn run_socket(url: String, mut peer: TransportPeer) {
    let ws_stream = match connect_async(url.as_str()).await {
        Ok((ws_stream, _response)) => ws_stream,
        Err(e) => {
            warn!("WebSocket connect to {url} failed: {e}");
            peer.emit(TransportEvent::Error(format!("Connection to {url} failed: {e}")));
            peer.emit(TransportEvent::Closed);
            return;
        }
    };

    if !peer.emit(TransportEvent::Opened) {
        debug!("Session dropped transport for {url} before open completed");
        return;
    }

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            outbound = peer.next_outbound() => match outbound {
                Some(text) => {
                    trace!("-> {text}");
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        peer.emit(TransportEvent::Error(format!("Send failed: {e}")));
                        peer.emit(TransportEvent::Closed);
                        return;
                    }
                }
                None => {
                    debug!("Closing WebSocket to {url}");
                    if let Err(e) = write.send(Message::Close(None)).await {
                        trace!("Close frame not delivered: {e}");
                    }
                    return;
                }
            },
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    trace!("<- {}", text.as_str());
                    peer.emit(TransportEvent::Frame(InboundFrame::Text(text.as_str().to_owned())));
                }
                Some(Ok(Message::Binary(bytes))) => {
                    peer.emit(TransportEvent::Frame(InboundFrame::Binary(bytes.to_vec())));
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!("Gateway closed WebSocket: {frame:?}");
                    peer.emit(TransportEvent::Closed);
                    return;
                }
                // Ping/Pong/raw frames are handled by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    peer.emit(TransportEvent::Error(format!("Read failed: {e}")));
                    peer.emit(TransportEvent::Closed);
                    return;
                }
                None => {
                    peer.emit(TransportEvent::Closed);
                    return;
                }
            },
        }
    }
}
