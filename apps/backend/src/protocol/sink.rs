use thiserror::Error;

use super::envelope::Envelope;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The connection is gone for good; its sink should be dropped.
    #[error("connection is closed")]
    Closed,
    /// The connection is alive but its queue is full; this event is lost.
    #[error("connection is saturated")]
    Full,
}

/// Outbound half of one connection as seen by a session.
///
/// Implementations must not block; a failed delivery only affects the
/// connection it was addressed to. `Closed` makes the session unbind the
/// connection.
pub trait EventSink: Send {
    fn deliver(&self, envelope: Envelope) -> Result<(), DeliveryError>;
}
