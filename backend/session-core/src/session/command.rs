use models::Channel;

use tokio::sync::oneshot;

#[derive(Debug)]
pub(crate) enum SessionOp {
    Subscribe(Vec<Channel>),
    Unsubscribe(Vec<Channel>),
    Reconnect,
    Disconnect,
    Dispose,
}

/// An operation plus the reply sent once its effects are published.
#[derive(Debug)]
pub(crate) struct SessionCommand {
    pub(crate) op: SessionOp,
    pub(crate) reply: oneshot::Sender<()>,
}
