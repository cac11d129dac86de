//! A seated participant and the connections bound to it.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::domain::ids::{ConnId, PlayerId};
use crate::domain::secret::{Secret, SecretDigest};
use crate::protocol::{DeliveryError, Envelope, EventSink};

pub struct Player {
    id: PlayerId,
    username: String,
    secret: SecretDigest,
    connections: HashMap<ConnId, Box<dyn EventSink>>,
    inactive_since: Option<Instant>,
}

impl Player {
    /// Creates a player bound to its first connection. The returned secret is
    /// the only copy of the cleartext; the player keeps just its digest.
    pub fn new(username: String, conn_id: ConnId, sink: Box<dyn EventSink>) -> (Self, Secret) {
        let secret = Secret::generate();
        let mut connections: HashMap<ConnId, Box<dyn EventSink>> = HashMap::new();
        connections.insert(conn_id, sink);
        let player = Self {
            id: PlayerId::new(),
            username,
            secret: secret.digest(),
            connections,
            inactive_since: None,
        };
        (player, secret)
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn verify_secret(&self, candidate: &Secret) -> bool {
        self.secret.matches(candidate)
    }

    pub fn bind(&mut self, conn_id: ConnId, sink: Box<dyn EventSink>) {
        self.connections.insert(conn_id, sink);
        self.inactive_since = None;
    }

    /// Drops one connection. Stamps `inactive_since` when it was the last.
    pub fn unbind(&mut self, conn_id: ConnId, now: Instant) -> bool {
        let removed = self.connections.remove(&conn_id).is_some();
        if removed && self.connections.is_empty() {
            self.inactive_since = Some(now);
        }
        removed
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn inactive_since(&self) -> Option<Instant> {
        self.inactive_since
    }

    /// Live connections keep a player active; without any, it stays active
    /// until `grace` has passed since the last one dropped.
    pub fn active(&self, now: Instant, grace: Duration) -> bool {
        if !self.connections.is_empty() {
            return true;
        }
        match self.inactive_since {
            Some(since) => now.saturating_duration_since(since) < grace,
            None => false,
        }
    }

    /// Sends the envelope to every bound connection independently. Closed
    /// connections are unbound on the way.
    pub fn emit(&mut self, envelope: &Envelope) {
        let mut closed = Vec::new();
        for (conn_id, sink) in &self.connections {
            if !deliver(*conn_id, sink.as_ref(), envelope.clone()) {
                closed.push(*conn_id);
            }
        }
        self.unbind_closed(closed);
    }

    pub fn emit_to(&mut self, conn_id: ConnId, envelope: Envelope) {
        let Some(sink) = self.connections.get(&conn_id) else {
            return;
        };
        if !deliver(conn_id, sink.as_ref(), envelope) {
            self.unbind_closed([conn_id]);
        }
    }

    fn unbind_closed(&mut self, closed: impl IntoIterator<Item = ConnId>) {
        let now = Instant::now();
        for conn_id in closed {
            self.unbind(conn_id, now);
        }
    }
}

impl fmt::Debug for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Player")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("connections", &self.connections.len())
            .field("inactive_since", &self.inactive_since)
            .finish()
    }
}

/// Returns `false` once the connection is closed and should be dropped.
pub(crate) fn deliver(conn_id: ConnId, sink: &dyn EventSink, envelope: Envelope) -> bool {
    let event = envelope.event.name();
    match sink.deliver(envelope) {
        Ok(()) => true,
        Err(err @ DeliveryError::Full) => {
            warn!(conn_id = %conn_id, event, error = %err, "[GAME] event delivery failed");
            true
        }
        Err(DeliveryError::Closed) => {
            debug!(conn_id = %conn_id, event, "[GAME] connection closed, unbinding");
            false
        }
    }
}
