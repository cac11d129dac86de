//! One actor per session.
//!
//! The actor's mailbox is the session's serialization point: commands from
//! every connection are applied strictly in arrival order, and the
//! inactivity check runs between commands, never during one.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use tracing::{debug, info};

use crate::domain::ids::{ConnId, GameId, PlayerId};
use crate::domain::secret::Secret;
use crate::domain::session::Session;
use crate::errors::GameError;
use crate::protocol::{EventSink, GameCommand};

#[derive(Message)]
#[rtype(result = "Result<PlayerId, GameError>")]
pub struct Join {
    pub conn_id: ConnId,
    pub username: String,
    pub sink: Box<dyn EventSink>,
}

#[derive(Message)]
#[rtype(result = "Result<(), GameError>")]
pub struct Connect {
    pub conn_id: ConnId,
    pub player_id: PlayerId,
    pub secret: Secret,
    pub sink: Box<dyn EventSink>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Spectate {
    pub conn_id: ConnId,
    pub sink: Box<dyn EventSink>,
}

/// Sent by a connection when it closes.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub conn_id: ConnId,
}

#[derive(Message)]
#[rtype(result = "Result<(), GameError>")]
pub struct Leave {
    pub player_id: PlayerId,
}

#[derive(Message)]
#[rtype(result = "Result<(), GameError>")]
pub struct Play {
    pub player_id: PlayerId,
    pub command: GameCommand,
}

/// Stops the actor when the session is inactive. Replies `true` if it did.
#[derive(Message)]
#[rtype(result = "bool")]
pub struct ReapIfInactive;

#[derive(Message)]
#[rtype(result = "()")]
pub struct Shutdown;

pub struct GameActor {
    session: Session,
    inactivity_grace: Duration,
    players: Arc<AtomicUsize>,
}

impl GameActor {
    /// `players` mirrors the roster size for lock-free listings.
    pub fn new(session: Session, inactivity_grace: Duration, players: Arc<AtomicUsize>) -> Self {
        Self {
            session,
            inactivity_grace,
            players,
        }
    }

    pub fn game_id(&self) -> GameId {
        self.session.id()
    }

    fn publish_player_count(&self) {
        self.players
            .store(self.session.player_count(), Ordering::Relaxed);
    }
}

impl Actor for GameActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!(game_id = %self.game_id(), "[GAME] session started");
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.players.store(0, Ordering::Relaxed);
        info!(game_id = %self.game_id(), "[GAME] session stopped");
    }
}

impl Handler<Join> for GameActor {
    type Result = Result<PlayerId, GameError>;

    fn handle(&mut self, msg: Join, _ctx: &mut Self::Context) -> Self::Result {
        let result = self.session.add_player(&msg.username, msg.conn_id, msg.sink);
        self.publish_player_count();
        result
    }
}

impl Handler<Connect> for GameActor {
    type Result = Result<(), GameError>;

    fn handle(&mut self, msg: Connect, _ctx: &mut Self::Context) -> Self::Result {
        self.session
            .connect(msg.player_id, &msg.secret, msg.conn_id, msg.sink)
    }
}

impl Handler<Spectate> for GameActor {
    type Result = ();

    fn handle(&mut self, msg: Spectate, _ctx: &mut Self::Context) -> Self::Result {
        self.session.spectate(msg.conn_id, msg.sink);
    }
}

impl Handler<Disconnect> for GameActor {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _ctx: &mut Self::Context) -> Self::Result {
        self.session.disconnect(msg.conn_id, Instant::now());
    }
}

impl Handler<Leave> for GameActor {
    type Result = Result<(), GameError>;

    fn handle(&mut self, msg: Leave, _ctx: &mut Self::Context) -> Self::Result {
        let result = self.session.remove_player(msg.player_id);
        self.publish_player_count();
        result
    }
}

impl Handler<Play> for GameActor {
    type Result = Result<(), GameError>;

    fn handle(&mut self, msg: Play, _ctx: &mut Self::Context) -> Self::Result {
        self.session.handle_command(msg.player_id, msg.command)
    }
}

impl Handler<ReapIfInactive> for GameActor {
    type Result = bool;

    fn handle(&mut self, _msg: ReapIfInactive, ctx: &mut Self::Context) -> Self::Result {
        if self.session.is_active(Instant::now(), self.inactivity_grace) {
            return false;
        }
        debug!(
            game_id = %self.game_id(),
            players = self.session.player_count(),
            "[GAME] session inactive, reaping"
        );
        ctx.stop();
        true
    }
}

impl Handler<Shutdown> for GameActor {
    type Result = ();

    fn handle(&mut self, _msg: Shutdown, ctx: &mut Self::Context) -> Self::Result {
        ctx.stop();
    }
}
