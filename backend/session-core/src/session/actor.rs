//! The session actor.
//!
//! One task owns the transport, both timers and the session state. Transport
//! events, timer fires and caller commands are multiplexed in a single
//! `select!`, so every step runs to completion before the next one starts and
//! a frame is always dispatched before the following frame is looked at.

use crate::codec;
use crate::heartbeat::HeartbeatScheduler;
use crate::reconnect::BackoffScheduler;
use crate::session::EventHandler;
use crate::session::command::{SessionCommand, SessionOp};
use crate::session::state::SessionState;
use crate::transport::{Connector, InboundFrame, Transport, TransportEvent};

use models::{Channel, ClientEnvelope, ConnectionStatus, ServerEnvelope, SessionSnapshot};

use std::future::pending;

use log::{debug, error, info, trace, warn};
use tokio::sync::{broadcast, mpsc, watch};
use url::Url;

pub(crate) struct SessionActor<C: Connector> {
    pub(crate) connector: C,
    pub(crate) endpoint: Url,
    pub(crate) auto_reconnect: bool,
    pub(crate) state: SessionState,
    pub(crate) heartbeat: HeartbeatScheduler,
    pub(crate) backoff: BackoffScheduler,
    pub(crate) handler: EventHandler,
    pub(crate) snapshot_tx: watch::Sender<SessionSnapshot>,
    pub(crate) status_tx: broadcast::Sender<ConnectionStatus>,
    /// Transitions made during the current step, broadcast by `publish`.
    pub(crate) pending_status: Vec<ConnectionStatus>,
    pub(crate) transport: Option<Transport>,
    pub(crate) epoch: u64,
}

impl<C: Connector> SessionActor<C> {
    pub(crate) async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) {
        info!("Session actor started for {}", self.endpoint);

        self.connect();
        self.publish();

        loop {
            tokio::select! {
                biased;

                event = next_event(&mut self.transport) => {
                    self.handle_transport_event(event.unwrap_or(TransportEvent::Closed));
                    self.publish();
                }
                () = self.heartbeat.tick() => {
                    self.send(&ClientEnvelope::Ping);
                }
                () = self.backoff.fired() => {
                    debug!("Reconnect timer fired");
                    self.connect();
                    self.publish();
                }
                command = commands.recv() => {
                    let Some(SessionCommand { op, reply }) = command else {
                        info!("All session handles dropped, shutting down");
                        self.teardown();
                        self.publish();
                        break;
                    };

                    let dispose = matches!(op, SessionOp::Dispose);
                    self.handle_op(op);
                    self.publish();
                    let _ = reply.send(());

                    if dispose {
                        break;
                    }
                }
            }
        }

        info!("Session actor stopped for {}", self.endpoint);
    }

    fn handle_op(&mut self, op: SessionOp) {
        match op {
            SessionOp::Subscribe(channels) => self.subscribe(channels),
            SessionOp::Unsubscribe(channels) => self.unsubscribe(channels),
            SessionOp::Reconnect => {
                info!("Manual reconnect requested");
                self.state.retry.reset();
                self.connect();
            }
            SessionOp::Disconnect => self.disconnect(),
            SessionOp::Dispose => self.teardown(),
        }
    }

    // ============================================
    // CONNECTION LIFECYCLE
    // ============================================

    fn connect(&mut self) {
        if let Some(stale) = self.transport.take() {
            debug!("Dropping stale transport (epoch {})", self.epoch);
            stale.close();
            self.heartbeat.stop();
            self.state.tracker.clear_confirmed();
        }
        self.backoff.cancel();

        self.epoch += 1;
        self.set_status(ConnectionStatus::Connecting);
        info!(
            "Connecting to {} (epoch {}, attempt {}/{})",
            self.endpoint,
            self.epoch,
            self.state.retry.attempts(),
            self.state.retry.max()
        );
        self.transport = Some(self.connector.open(&self.endpoint));
    }

    fn disconnect(&mut self) {
        info!("Disconnect requested, automatic reconnect suspended");
        self.state.retry.exhaust();
        self.heartbeat.stop();
        self.backoff.cancel();
        if let Some(transport) = self.transport.take() {
            transport.close();
        }
        self.state.tracker.clear_confirmed();
        self.set_status(ConnectionStatus::Disconnected);
    }

    /// Disposal: heartbeat, then reconnect timer, then the transport, with no
    /// close handling for it.
    fn teardown(&mut self) {
        self.heartbeat.stop();
        self.backoff.cancel();
        if let Some(transport) = self.transport.take() {
            transport.close();
        }
        self.state.tracker.clear_confirmed();
        self.set_status(ConnectionStatus::Disconnected);
        debug!(
            "Session disposed with retry counter at {}",
            self.state.retry.attempts()
        );
    }

    fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Opened => self.on_open(),
            TransportEvent::Frame(frame) => self.on_frame(frame),
            TransportEvent::Error(message) => {
                warn!("Transport error (epoch {}): {message}", self.epoch);
                self.state.last_error = Some(message);
                self.set_status(ConnectionStatus::Error);
            }
            TransportEvent::Closed => self.on_close(),
        }
    }

    fn on_open(&mut self) {
        info!("Connected to {} (epoch {})", self.endpoint, self.epoch);
        self.set_status(ConnectionStatus::Connected);
        self.state.retry.reset();
        self.heartbeat.start();

        let channels = self.state.tracker.resubscribe_set();
        if !channels.is_empty() {
            self.send(&ClientEnvelope::Subscribe { channels });
        }
    }

    fn on_close(&mut self) {
        self.transport = None;
        self.heartbeat.stop();
        self.state.tracker.clear_confirmed();
        self.set_status(ConnectionStatus::Disconnected);

        if !self.auto_reconnect {
            info!("Connection closed (epoch {}), auto-reconnect disabled", self.epoch);
            return;
        }

        if self.state.retry.can_retry() {
            let attempt = self.state.retry.advance();
            let delay = self.backoff.schedule(attempt);
            info!(
                "Connection closed (epoch {}), reconnect attempt {attempt}/{} in {delay:?}",
                self.epoch,
                self.state.retry.max()
            );
        } else {
            warn!(
                "Connection closed (epoch {}), giving up after {} reconnect attempts",
                self.epoch,
                self.state.retry.max()
            );
        }
    }

    // ============================================
    // INBOUND DISPATCH
    // ============================================

    fn on_frame(&mut self, frame: InboundFrame) {
        let envelope = match codec::decode_frame(frame) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Dropping malformed frame: {e}");
                return;
            }
        };

        match envelope {
            ServerEnvelope::Event { channel, data } => {
                trace!("Event on {channel}");
                (self.handler)(channel, data);
            }
            ServerEnvelope::Ack { action, channels } => {
                debug!("Ack {action:?} for {channels:?}");
                self.state.tracker.apply_ack(action, &channels);
            }
            ServerEnvelope::Pong => trace!("Pong"),
            ServerEnvelope::Error { message } => {
                warn!("Gateway reported error: {message}");
                self.state.last_error = Some(message);
            }
        }
    }

    // ============================================
    // SUBSCRIPTIONS
    // ============================================

    fn subscribe(&mut self, channels: Vec<Channel>) {
        let added = self.state.tracker.add_desired(channels);
        if added.is_empty() {
            return;
        }

        debug!("Desired channels added: {added:?}");
        if self.state.status.is_connected() {
            self.send(&ClientEnvelope::Subscribe { channels: added });
        }
    }

    fn unsubscribe(&mut self, channels: Vec<Channel>) {
        let removed = self.state.tracker.remove(channels);
        if removed.is_empty() {
            return;
        }

        debug!("Channels removed: {removed:?}");
        if self.state.status.is_connected() {
            self.send(&ClientEnvelope::Unsubscribe { channels: removed });
        }
    }

    // ============================================
    // HELPERS
    // ============================================

    fn send(&self, envelope: &ClientEnvelope) {
        let Some(transport) = self.transport.as_ref() else {
            debug!("No transport, not sending {envelope:?}");
            return;
        };

        match codec::encode(envelope) {
            Ok(text) => {
                if let Err(e) = transport.send(text) {
                    warn!("Failed to send frame: {e}");
                }
            }
            Err(e) => error!("Failed to encode frame: {e}"),
        }
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.state.status == status {
            return;
        }
        debug!("Status {} -> {}", self.state.status, status);
        self.state.status = status;
        self.pending_status.push(status);
    }

    /// Publish the snapshot, then the transitions that led to it, so a status
    /// listener never reads a snapshot older than the change it was told about.
    fn publish(&mut self) {
        self.snapshot_tx
            .send_replace(self.state.snapshot(self.backoff.is_pending()));
        for status in self.pending_status.drain(..) {
            // No receivers is fine.
            let _ = self.status_tx.send(status);
        }
    }
}

async fn next_event(transport: &mut Option<Transport>) -> Option<TransportEvent> {
    match transport.as_mut() {
        Some(transport) => transport.next_event().await,
        None => pending().await,
    }
}
