use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::domain::ids::{GameId, PlayerId};
use crate::domain::secret::Secret;

/// Inbound wire object: `{name, data?}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "name", content = "data", rename_all = "snake_case")]
pub enum Command {
    Join {
        game_id: GameId,
        username: String,
    },
    Connect {
        game_id: GameId,
        player_id: PlayerId,
        secret: Secret,
    },
    Spectate {
        game_id: GameId,
    },
    Leave,
    Start,
    Mark {
        field: i64,
    },
}

/// The subset of commands a session processes for a seated player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    Start,
    Mark { field: i64 },
}

impl Command {
    pub fn as_game_command(&self) -> Option<GameCommand> {
        match self {
            Command::Start => Some(GameCommand::Start),
            Command::Mark { field } => Some(GameCommand::Mark { field: *field }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Malformed message: expected a JSON object")]
    NotAnObject,
    #[error("Malformed message: {0}")]
    Malformed(String),
}

pub fn parse_command(text: &str) -> Result<Command, ProtocolError> {
    let value: Value =
        serde_json::from_str(text).map_err(|err| ProtocolError::Malformed(err.to_string()))?;
    if !value.is_object() {
        return Err(ProtocolError::NotAnObject);
    }
    serde_json::from_value(value).map_err(|err| ProtocolError::Malformed(err.to_string()))
}
