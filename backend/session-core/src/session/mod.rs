//! Connection manager for the channel stream.
//!
//! [`ConnectionManager`] is the caller-facing handle. It spawns one actor task
//! (see `actor.rs`) that owns the transport, the heartbeat and reconnect
//! timers, the retry counter and the subscription tracker. The handle talks
//! to it with commands and reads a [`SessionSnapshot`] the actor republishes
//! after every step.
//!
//! # Lifecycle
//!
//! The session connects as soon as it is started. Dropping the handle or
//! calling [`ConnectionManager::dispose`] stops the actor: the heartbeat is
//! cancelled, then the pending reconnect timer, then the transport is closed
//! without running its close handling. Nothing fires afterwards.
//!
//! # Errors
//!
//! Transport failures, malformed frames and gateway-reported errors never
//! surface as `Err`; they show up in [`SessionSnapshot::status`] and
//! [`SessionSnapshot::last_error`]. Operations only fail when the actor is
//! already gone.

mod actor;
mod command;
pub mod state;

use crate::config::SessionConfig;
use crate::error::session::SessionError;
use crate::heartbeat::HeartbeatScheduler;
use crate::reconnect::BackoffScheduler;
use crate::session::actor::SessionActor;
use crate::session::command::{SessionCommand, SessionOp};
use crate::session::state::{RetryState, SessionState};
use crate::subscription::SubscriptionTracker;
use crate::transport::{Connector, WsConnector};

use common::ErrorLocation;
use models::{Channel, ConnectionStatus, SessionSnapshot};

use std::collections::BTreeSet;
use std::panic::Location;
use std::time::Duration;

use backoff::ExponentialBackoffBuilder;
use backoff::backoff::Backoff;
use log::trace;
use serde_json::Value;
use tokio::runtime::Handle as RuntimeHandle;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep as TokioSleep;

/// Receives every `event` frame as `(channel, data)`, in arrival order.
pub type EventHandler = Box<dyn FnMut(Channel, Value) + Send + 'static>;

const COMMAND_CHANNEL_CAPACITY: usize = 100;
const STATUS_CHANNEL_CAPACITY: usize = 64;
const WAIT_INITIAL_INTERVAL: Duration = Duration::from_millis(10);
const WAIT_MAX_INTERVAL: Duration = Duration::from_millis(250);

pub struct ConnectionManager {
    commands: mpsc::Sender<SessionCommand>,
    snapshot: watch::Receiver<SessionSnapshot>,
    status_tx: broadcast::Sender<ConnectionStatus>,
    actor: Option<JoinHandle<()>>,
}

impl ConnectionManager {
    /// Start a session over WebSocket using [`WsConnector`].
    ///
    /// # Errors
    ///
    /// See [`ConnectionManager::start`].
    pub fn start_ws<H>(config: SessionConfig, handler: H) -> Result<Self, SessionError>
    where
        H: FnMut(Channel, Value) + Send + 'static,
    {
        Self::start(config, WsConnector, handler)
    }

    /// Validate `config`, spawn the session actor and begin connecting.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Config`] if the config is invalid
    /// - [`SessionError::Runtime`] if called outside a tokio runtime
    pub fn start<C, H>(config: SessionConfig, connector: C, handler: H) -> Result<Self, SessionError>
    where
        C: Connector,
        H: FnMut(Channel, Value) + Send + 'static,
    {
        config.validate()?;
        let endpoint = config.endpoint()?;

        let runtime = RuntimeHandle::try_current().map_err(|e| SessionError::Runtime {
            message: format!("ConnectionManager must be started inside a tokio runtime: {e}"),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let state = SessionState::new(
            SubscriptionTracker::new(config.channels.iter().copied()),
            RetryState::new(config.max_reconnect_attempts),
        );

        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        // The actor connects before it does anything else, so readers never
        // see the idle state of a session that has not run yet.
        let mut initial = state.snapshot(false);
        initial.status = ConnectionStatus::Connecting;
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let (status_tx, _) = broadcast::channel(STATUS_CHANNEL_CAPACITY);

        let actor = SessionActor {
            connector,
            endpoint,
            auto_reconnect: config.auto_reconnect,
            state,
            heartbeat: HeartbeatScheduler::new(config.heartbeat_interval()),
            backoff: BackoffScheduler::new(config.backoff_policy()),
            handler: Box::new(handler),
            snapshot_tx,
            status_tx: status_tx.clone(),
            pending_status: Vec::new(),
            transport: None,
            epoch: 0,
        };

        let actor = runtime.spawn(actor.run(command_rx));

        Ok(Self {
            commands: command_tx,
            snapshot: snapshot_rx,
            status_tx,
            actor: Some(actor),
        })
    }

    // ============================================
    // STATE
    // ============================================

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.snapshot.borrow().status
    }

    pub fn is_connected(&self) -> bool {
        self.status().is_connected()
    }

    pub fn last_error(&self) -> Option<String> {
        self.snapshot.borrow().last_error.clone()
    }

    /// Channels the gateway has acknowledged in the current connection.
    pub fn subscribed_channels(&self) -> BTreeSet<Channel> {
        self.snapshot.borrow().subscribed_channels.clone()
    }

    /// Every status transition from now on, including the transient `Error`.
    pub fn status_changes(&self) -> broadcast::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    // ============================================
    // OPERATIONS
    // ============================================

    /// Add channels to the desired set. When connected, only the newly added
    /// channels are requested from the gateway.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session was disposed.
    pub async fn subscribe(
        &self,
        channels: impl IntoIterator<Item = Channel>,
    ) -> Result<(), SessionError> {
        self.request(SessionOp::Subscribe(channels.into_iter().collect()))
            .await
    }

    /// Remove channels from the desired and confirmed sets immediately.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session was disposed.
    pub async fn unsubscribe(
        &self,
        channels: impl IntoIterator<Item = Channel>,
    ) -> Result<(), SessionError> {
        self.request(SessionOp::Unsubscribe(channels.into_iter().collect()))
            .await
    }

    /// Reset the retry counter and connect now, skipping any pending backoff.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session was disposed.
    pub async fn reconnect(&self) -> Result<(), SessionError> {
        self.request(SessionOp::Reconnect).await
    }

    /// Close the connection and stop automatic reconnects until
    /// [`ConnectionManager::reconnect`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session was disposed.
    pub async fn disconnect(&self) -> Result<(), SessionError> {
        self.request(SessionOp::Disconnect).await
    }

    /// Tear the session down and wait for the actor to exit.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the actor already stopped, or
    /// [`SessionError::Runtime`] if it panicked.
    pub async fn dispose(mut self) -> Result<(), SessionError> {
        self.request(SessionOp::Dispose).await?;

        if let Some(actor) = self.actor.take() {
            actor.await.map_err(|e| SessionError::Runtime {
                message: format!("Session actor failed: {e}"),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        Ok(())
    }

    /// Poll the snapshot until `expected` is the current status.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_for_status(&self, expected: ConnectionStatus, timeout: Duration) -> bool {
        self.wait_until(|snapshot| snapshot.status == expected, timeout)
            .await
    }

    /// Poll the snapshot with exponential backoff until `predicate` holds.
    ///
    /// Returns `false` if `timeout` elapses first.
    pub async fn wait_until<F>(&self, predicate: F, timeout: Duration) -> bool
    where
        F: Fn(&SessionSnapshot) -> bool,
    {
        let mut backoff = ExponentialBackoffBuilder::new()
            .with_initial_interval(WAIT_INITIAL_INTERVAL)
            .with_max_interval(WAIT_MAX_INTERVAL)
            .with_max_elapsed_time(Some(timeout))
            .build();

        loop {
            if predicate(&*self.snapshot.borrow()) {
                return true;
            }

            match backoff.next_backoff() {
                Some(duration) => {
                    trace!("Session condition not met, retrying after {duration:?}");
                    TokioSleep(duration).await;
                }
                None => return predicate(&*self.snapshot.borrow()),
            }
        }
    }

    async fn request(&self, op: SessionOp) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.commands
            .send(SessionCommand {
                op,
                reply: reply_tx,
            })
            .await
            .map_err(|e| SessionError::Closed {
                message: format!("Session actor is gone, {:?} not delivered", e.0.op),
                location: ErrorLocation::from(Location::caller()),
            })?;

        reply_rx.await.map_err(|_| SessionError::Closed {
            message: String::from("Session actor stopped before replying"),
            location: ErrorLocation::from(Location::caller()),
        })
    }
}
