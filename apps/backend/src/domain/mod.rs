//! Domain layer: the grid, players and the session state machine.
//!
//! Nothing here knows about sockets or actors; events leave through the
//! `EventSink` seam.

pub mod grid;
pub mod ids;
pub mod player;
pub mod secret;
pub mod session;

#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_grid;
#[cfg(test)]
mod tests_props_turns;

pub use grid::{Field, Grid, Mark};
pub use ids::{ConnId, GameId, PlayerId};
pub use player::Player;
pub use secret::{Secret, SecretDigest};
pub use session::{MarkOutcome, Session, SessionState};
