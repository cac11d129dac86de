use serde::{Serialize, Serializer};

use crate::domain::grid::Mark;
use crate::domain::ids::PlayerId;
use crate::domain::secret::Secret;

/// Who caused an event. Serialized as the player id, or `"server"` for
/// transport-level notices that no player triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Server,
    Player(PlayerId),
}

impl Serialize for Origin {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Origin::Server => serializer.serialize_str("server"),
            Origin::Player(id) => id.serialize(serializer),
        }
    }
}

impl From<PlayerId> for Origin {
    fn from(value: PlayerId) -> Self {
        Origin::Player(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishResult {
    Winner,
    Looser,
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "name", content = "data", rename_all = "snake_case")]
pub enum Event {
    Board {
        board: Vec<Mark<PlayerId>>,
    },
    Started,
    Marked {
        field: usize,
    },
    ForbiddenAction {
        message: String,
    },
    MyTurn,
    OpponentsTurn {
        player: PlayerId,
    },
    Finish {
        result: FinishResult,
        #[serde(skip_serializing_if = "Option::is_none")]
        winner: Option<PlayerId>,
    },
    Joined {
        secret: Secret,
    },
    Connected {
        username: String,
    },
    Left,
    NewPlayer {
        username: String,
    },
    Error {
        message: String,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Board { .. } => "board",
            Event::Started => "started",
            Event::Marked { .. } => "marked",
            Event::ForbiddenAction { .. } => "forbidden_action",
            Event::MyTurn => "my_turn",
            Event::OpponentsTurn { .. } => "opponents_turn",
            Event::Finish { .. } => "finish",
            Event::Joined { .. } => "joined",
            Event::Connected { .. } => "connected",
            Event::Left => "left",
            Event::NewPlayer { .. } => "new_player",
            Event::Error { .. } => "error",
        }
    }
}

/// Outbound wire object: `{origin, event: {name, data?}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Envelope {
    pub origin: Origin,
    pub event: Event,
}

impl Envelope {
    pub fn new(origin: impl Into<Origin>, event: Event) -> Self {
        Self {
            origin: origin.into(),
            event,
        }
    }

    pub fn server(event: Event) -> Self {
        Self {
            origin: Origin::Server,
            event,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::server(Event::Error {
            message: message.into(),
        })
    }
}
