use serde::{Deserialize, Serialize};

use crate::domain::grid::{MAX_SIDE_LENGTH, MIN_WIN_RUN_LENGTH};

/// Smallest board a round is played on.
pub const MIN_BOARD_SIZE: usize = 3;
/// Largest board a round is played on; longer runs could never fit.
pub const MAX_BOARD_SIZE: usize = MAX_SIDE_LENGTH;
/// A round needs at least two players.
pub const MIN_PLAYERS: usize = 2;

/// Per-session rules. Always pass through [`GameOptions::sanitized`] before
/// handing the options to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameOptions {
    /// Fixed side length; when absent the board is sized `players + 1`.
    pub board_size: Option<usize>,
    pub win_run_length: usize,
    /// Roster size that closes joining and auto-starts the round.
    pub max_players: usize,
    pub min_players: usize,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            board_size: None,
            win_run_length: MIN_WIN_RUN_LENGTH,
            max_players: 2,
            min_players: MIN_PLAYERS,
        }
    }
}

impl GameOptions {
    /// Raises every value to its minimum and caps the board dimensions at
    /// [`MAX_BOARD_SIZE`].
    pub fn sanitized(self) -> Self {
        let min_players = self.min_players.max(MIN_PLAYERS);
        Self {
            board_size: self
                .board_size
                .map(|size| size.clamp(MIN_BOARD_SIZE, MAX_BOARD_SIZE)),
            win_run_length: self
                .win_run_length
                .clamp(MIN_WIN_RUN_LENGTH, MAX_BOARD_SIZE),
            max_players: self.max_players.max(min_players),
            min_players,
        }
    }

    /// Side length for a round with `players` seated. Never smaller than the
    /// run length and never above [`MAX_BOARD_SIZE`].
    pub fn side_length_for(&self, players: usize) -> usize {
        self.board_size
            .unwrap_or(players.saturating_add(1))
            .max(MIN_BOARD_SIZE)
            .max(self.win_run_length)
            .min(MAX_BOARD_SIZE)
    }
}
