//! Actor layer: one `GameActor` per session, one `WsSession` per socket,
//! and the registry that indexes the sessions.

pub mod game;
pub mod hub;
pub mod session;
