use tracing::warn;

use crate::domain::ids::{ConnId, GameId, PlayerId};
use crate::errors::GameError;

/// Log a rejected reconnection attempt. The secret itself is never logged.
pub fn reconnect_rejected(game_id: GameId, player_id: PlayerId, conn_id: ConnId, err: &GameError) {
    warn!(
        event = "SECURITY_RECONNECT_REJECTED",
        %game_id,
        %player_id,
        %conn_id,
        code = %err.code(),
        "Reconnection rejected"
    );
}

/// Log a client that keeps sending undecodable frames.
pub fn malformed_frames(conn_id: ConnId, count: u32) {
    warn!(
        event = "SECURITY_MALFORMED_FRAMES",
        %conn_id,
        count,
        "Repeated malformed messages on one connection"
    );
}
