//! Dispatch protocol shared by sessions and connections: inbound commands,
//! outbound origin-tagged envelopes, and the sink seam events flow through.

pub mod command;
pub mod envelope;
pub mod sink;

pub use command::{parse_command, Command, GameCommand, ProtocolError};
pub use envelope::{Envelope, Event, FinishResult, Origin};
pub use sink::{DeliveryError, EventSink};
