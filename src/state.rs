use crate::dispatch::{Dispatcher, Outbound};
use crate::messages::{ClientMessage, ServerMessage};
use crate::rooms::ConnectionId;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(50);
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Process-wide relay state: the dispatcher plus each live connection's
/// outbound queue.
///
/// Every dispatcher call runs to completion under one lock, so operations
/// see the rooms and memberships exactly as the previous one left them.
pub struct RelayState {
    dispatcher: Mutex<Dispatcher>,
    connections: DashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayState {
    pub fn new() -> Self {
        Self {
            dispatcher: Mutex::new(Dispatcher::new()),
            connections: DashMap::new(),
        }
    }

    fn dispatcher(&self) -> MutexGuard<'_, Dispatcher> {
        self.dispatcher.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open an outbound queue for a new connection
    pub fn register(&self, connection_id: ConnectionId) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections.insert(connection_id, tx);
        debug!(%connection_id, connections = self.connections.len(), "Registered connection");
        rx
    }

    pub fn dispatch(&self, connection_id: ConnectionId, msg: ClientMessage) {
        let out = self.dispatcher().handle(connection_id, msg);
        self.deliver(out);
    }

    /// Tear down a connection: close its queue and release its room.
    pub fn disconnect(&self, connection_id: ConnectionId) {
        self.connections.remove(&connection_id);
        let out = self.dispatcher().disconnect(connection_id);
        self.deliver(out);
    }

    pub fn sweep_idle(&self, timeout: Duration) {
        let out = self.dispatcher().sweep_idle(Instant::now(), timeout);
        self.deliver(out);
    }

    pub fn room_count(&self) -> usize {
        self.dispatcher().registry().room_count()
    }

    fn deliver(&self, out: Vec<Outbound>) {
        for Outbound { to, message } in out {
            let Some(tx) = self.connections.get(&to) else {
                debug!(%to, "Dropping message for closed connection");
                continue;
            };
            if tx.send(message).is_err() {
                debug!(%to, "Dropping message, receiver already closed");
            }
        }
    }
}

/// Periodically expire rooms left waiting alone for `timeout`.
pub fn spawn_idle_sweep(state: Arc<RelayState>, timeout: Duration) {
    let period = timeout.clamp(MIN_SWEEP_INTERVAL, MAX_SWEEP_INTERVAL);
    info!(?timeout, ?period, "Idle room sweep enabled");

    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            state.sweep_idle(timeout);
        }
    });
}
