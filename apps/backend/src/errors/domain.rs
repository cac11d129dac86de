//! Session-level error type.
//!
//! Transport- and HTTP-agnostic. Sessions return it from every mutating
//! operation; a failure always means the session state is unchanged.
//! Handlers convert it with `From<GameError> for AppError`.

use thiserror::Error;

use super::error_code::ErrorCode;
use crate::domain::ids::PlayerId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("The game is full.")]
    GameFull,
    #[error("The game has already started.")]
    AlreadyStarted,
    #[error("{0}")]
    ForbiddenAction(String),
    #[error("It is the turn of player {current}.")]
    NotYourTurn { current: PlayerId },
    #[error("The game does not exist.")]
    NoSuchGame,
    #[error("The player does not exist in this game.")]
    NoSuchPlayer,
    #[error("The secret does not match.")]
    InvalidSecret,
    #[error("The username must not be empty.")]
    InvalidUsername,
    #[error("This connection is already part of a game. Send 'leave' first.")]
    AlreadyInGame,
    #[error("This connection is not playing in a game.")]
    NotInGame,
}

impl GameError {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::ForbiddenAction(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GameError::GameFull => ErrorCode::GameFull,
            GameError::AlreadyStarted => ErrorCode::AlreadyStarted,
            GameError::ForbiddenAction(_) => ErrorCode::ForbiddenAction,
            GameError::NotYourTurn { .. } => ErrorCode::NotYourTurn,
            GameError::NoSuchGame => ErrorCode::GameNotFound,
            GameError::NoSuchPlayer => ErrorCode::PlayerNotFound,
            GameError::InvalidSecret => ErrorCode::InvalidSecret,
            GameError::InvalidUsername => ErrorCode::InvalidUsername,
            GameError::AlreadyInGame => ErrorCode::AlreadyInGame,
            GameError::NotInGame => ErrorCode::NotInGame,
        }
    }
}
