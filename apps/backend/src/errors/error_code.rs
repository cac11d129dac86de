//! Error codes for the tic-tac-toe backend.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//! All codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings that appear
//! in HTTP problem details.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Session rules
    /// Roster reached the configured maximum
    GameFull,
    /// Joining is closed once a round started
    AlreadyStarted,
    /// Legal message, illegal in the current state
    ForbiddenAction,
    /// Another player holds the turn
    NotYourTurn,

    // Identity
    /// Reconnection secret did not match
    InvalidSecret,
    /// Username missing or blank
    InvalidUsername,
    /// Connection already bound to a session
    AlreadyInGame,
    /// Connection not bound to a session
    NotInGame,

    // Resource Not Found
    /// Unknown session id
    GameNotFound,
    /// Unknown player id within a session
    PlayerNotFound,

    // Request Validation
    /// Malformed or undecodable message
    BadRequest,
    /// Payload decoded but violates a constraint
    ValidationError,

    // System Errors
    /// Configuration error
    ConfigError,
    /// Internal server error
    Internal,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 14] = [
        Self::GameFull,
        Self::AlreadyStarted,
        Self::ForbiddenAction,
        Self::NotYourTurn,
        Self::InvalidSecret,
        Self::InvalidUsername,
        Self::AlreadyInGame,
        Self::NotInGame,
        Self::GameNotFound,
        Self::PlayerNotFound,
        Self::BadRequest,
        Self::ValidationError,
        Self::ConfigError,
        Self::Internal,
    ];

    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GameFull => "GAME_FULL",
            Self::AlreadyStarted => "ALREADY_STARTED",
            Self::ForbiddenAction => "FORBIDDEN_ACTION",
            Self::NotYourTurn => "NOT_YOUR_TURN",

            Self::InvalidSecret => "INVALID_SECRET",
            Self::InvalidUsername => "INVALID_USERNAME",
            Self::AlreadyInGame => "ALREADY_IN_GAME",
            Self::NotInGame => "NOT_IN_GAME",

            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",

            Self::BadRequest => "BAD_REQUEST",
            Self::ValidationError => "VALIDATION_ERROR",

            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
