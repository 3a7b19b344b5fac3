//! In-process stream gateway for integration tests.
//!
//! Speaks the real wire protocol over tokio-tungstenite:
//! - Acks every subscribe/unsubscribe with the requested channels
//! - Answers pings with pongs
//! - Records every client envelope it receives
//! - Pushes arbitrary frames or drops all connections on request

use models::{AckAction, ClientEnvelope, ServerEnvelope};

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone)]
enum GatewayCommand {
    Push(String),
    DropConnections,
}

#[derive(Default)]
struct GatewayStats {
    accepted: AtomicUsize,
    active: AtomicUsize,
    received: Mutex<Vec<ClientEnvelope>>,
}

pub struct TestGateway {
    addr: SocketAddr,
    commands: broadcast::Sender<GatewayCommand>,
    stats: Arc<GatewayStats>,
    task: JoinHandle<()>,
}

impl TestGateway {
    /// Bind to an ephemeral localhost port and start accepting.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test gateway");
        let addr = listener.local_addr().expect("Listener has no address");
        let (commands, _) = broadcast::channel(64);
        let stats = Arc::new(GatewayStats::default());

        let task = {
            let commands = commands.clone();
            let stats = Arc::clone(&stats);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    stats.accepted.fetch_add(1, Ordering::SeqCst);
                    tokio::spawn(serve_connection(
                        stream,
                        commands.subscribe(),
                        Arc::clone(&stats),
                    ));
                }
            })
        };

        Self {
            addr,
            commands,
            stats,
            task,
        }
    }

    /// Page-style origin the session derives `ws://.../ws` from.
    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn push(&self, frame: Value) {
        self.push_raw(frame.to_string());
    }

    pub fn push_raw(&self, text: impl Into<String>) {
        let _ = self.commands.send(GatewayCommand::Push(text.into()));
    }

    /// Close every open connection from the server side.
    pub fn drop_connections(&self) {
        let _ = self.commands.send(GatewayCommand::DropConnections);
    }

    pub fn received(&self) -> Vec<ClientEnvelope> {
        self.stats.received.lock().unwrap().clone()
    }

    pub fn accepted(&self) -> usize {
        self.stats.accepted.load(Ordering::SeqCst)
    }

    pub fn active(&self) -> usize {
        self.stats.active.load(Ordering::SeqCst)
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    listener.local_addr().expect("Listener has no address")
}

async fn serve_connection(
    stream: TcpStream,
    mut commands: broadcast::Receiver<GatewayCommand>,
    stats: Arc<GatewayStats>,
) {
    let Ok(ws) = accept_async(stream).await else {
        return;
    };
    stats.active.fetch_add(1, Ordering::SeqCst);
    let (mut write, mut read) = ws.split();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Ok(GatewayCommand::Push(text)) => {
                    if write.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Ok(GatewayCommand::DropConnections) | Err(broadcast::error::RecvError::Closed) => {
                    let _ = write.send(Message::Close(None)).await;
                    break;
                }
                Err(broadcast::error::RecvError::Lagged(_)) => {}
            },
            inbound = read.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    let Ok(envelope) = serde_json::from_str::<ClientEnvelope>(text.as_str()) else {
                        continue;
                    };
                    let reply = reply_to(&envelope);
                    stats.received.lock().unwrap().push(envelope);

                    let frame = serde_json::to_string(&reply).expect("Reply should serialize");
                    if write.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    stats.active.fetch_sub(1, Ordering::SeqCst);
}

fn reply_to(envelope: &ClientEnvelope) -> ServerEnvelope {
    match envelope {
        ClientEnvelope::Subscribe { channels } => ServerEnvelope::Ack {
            action: AckAction::Subscribed,
            channels: channels.clone(),
        },
        ClientEnvelope::Unsubscribe { channels } => ServerEnvelope::Ack {
            action: AckAction::Unsubscribed,
            channels: channels.clone(),
        },
        ClientEnvelope::Ping => ServerEnvelope::Pong,
    }
}
