//! Registry of live sessions.
//!
//! Public and private sessions live in separate maps; lookups try public
//! first. The maps only hold actor addresses, so no map reference is ever
//! held across an await.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use dashmap::DashMap;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::{GameOptions, ServerConfig};
use crate::domain::ids::{ConnId, GameId, PlayerId};
use crate::domain::secret::Secret;
use crate::domain::session::Session;
use crate::errors::GameError;
use crate::protocol::EventSink;
use crate::ws::game::{
    Connect, Disconnect, GameActor, Join, Leave, ReapIfInactive, Shutdown, Spectate,
};

struct GameEntry {
    addr: Addr<GameActor>,
    players: Arc<AtomicUsize>,
}

/// Row of the public lobby listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameListing {
    pub id: GameId,
    pub players: usize,
}

pub struct GameRegistry {
    public_games: DashMap<GameId, GameEntry>,
    private_games: DashMap<GameId, GameEntry>,
    default_options: GameOptions,
    inactivity_grace: Duration,
}

impl GameRegistry {
    pub fn new(default_options: GameOptions, inactivity_grace: Duration) -> Self {
        Self {
            public_games: DashMap::new(),
            private_games: DashMap::new(),
            default_options: default_options.sanitized(),
            inactivity_grace,
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.default_game, config.inactivity_grace)
    }

    /// Sweeps inactive sessions, then starts a new one. Must be called from
    /// within an actix system.
    pub async fn create(&self, public: bool, options: Option<GameOptions>) -> GameId {
        self.sweep().await;

        let id = GameId::new();
        let options = options.unwrap_or(self.default_options).sanitized();
        let players = Arc::new(AtomicUsize::new(0));
        let session = Session::new(id, options, Instant::now());
        let addr = GameActor::new(session, self.inactivity_grace, players.clone()).start();

        let map = if public {
            &self.public_games
        } else {
            &self.private_games
        };
        map.insert(id, GameEntry { addr, players });

        info!(
            game_id = %id,
            public,
            max_players = options.max_players,
            win_run_length = options.win_run_length,
            "[REGISTRY] game created"
        );
        id
    }

    pub async fn join(
        &self,
        game_id: GameId,
        conn_id: ConnId,
        username: String,
        sink: Box<dyn EventSink>,
    ) -> Result<(Addr<GameActor>, PlayerId), GameError> {
        let addr = self.lookup(game_id)?;
        let player_id = addr
            .send(Join {
                conn_id,
                username,
                sink,
            })
            .await
            .map_err(|_| GameError::NoSuchGame)??;
        Ok((addr, player_id))
    }

    pub async fn connect(
        &self,
        game_id: GameId,
        player_id: PlayerId,
        secret: Secret,
        conn_id: ConnId,
        sink: Box<dyn EventSink>,
    ) -> Result<Addr<GameActor>, GameError> {
        let addr = self.lookup(game_id)?;
        addr.send(Connect {
            conn_id,
            player_id,
            secret,
            sink,
        })
        .await
        .map_err(|_| GameError::NoSuchGame)??;
        Ok(addr)
    }

    pub async fn spectate(
        &self,
        game_id: GameId,
        conn_id: ConnId,
        sink: Box<dyn EventSink>,
    ) -> Result<Addr<GameActor>, GameError> {
        let addr = self.lookup(game_id)?;
        addr.send(Spectate { conn_id, sink })
            .await
            .map_err(|_| GameError::NoSuchGame)?;
        Ok(addr)
    }

    /// Unbinds `conn_id` from whatever it holds in the session. Unknown
    /// games are ignored.
    pub fn disconnect(&self, game_id: GameId, conn_id: ConnId) {
        if let Ok(addr) = self.lookup(game_id) {
            addr.do_send(Disconnect { conn_id });
        }
    }

    /// Removes the player, then drops the session if that left it inactive.
    pub async fn leave(&self, game_id: GameId, player_id: PlayerId) -> Result<(), GameError> {
        let addr = self.lookup(game_id)?;
        addr.send(Leave { player_id })
            .await
            .map_err(|_| GameError::NoSuchGame)??;
        self.reap(game_id, addr).await;
        Ok(())
    }

    /// Asks every session whether it is still active and forgets the ones
    /// that stopped. Returns how many were removed.
    pub async fn sweep(&self) -> usize {
        let games: Vec<(GameId, Addr<GameActor>)> = self
            .public_games
            .iter()
            .chain(self.private_games.iter())
            .map(|entry| (*entry.key(), entry.value().addr.clone()))
            .collect();

        let results = join_all(
            games
                .into_iter()
                .map(|(id, addr)| async move { self.reap(id, addr).await }),
        )
        .await;
        let reaped = results.into_iter().filter(|reaped| *reaped).count();

        if reaped > 0 {
            info!(reaped, remaining = self.game_count(), "[REGISTRY] sweep finished");
        }
        reaped
    }

    async fn reap(&self, game_id: GameId, addr: Addr<GameActor>) -> bool {
        // an actor that is already gone counts as reaped
        let inactive = addr.send(ReapIfInactive).await.unwrap_or(true);
        if inactive {
            self.public_games.remove(&game_id);
            self.private_games.remove(&game_id);
            debug!(game_id = %game_id, "[REGISTRY] game removed");
        }
        inactive
    }

    fn lookup(&self, game_id: GameId) -> Result<Addr<GameActor>, GameError> {
        self.public_games
            .get(&game_id)
            .or_else(|| self.private_games.get(&game_id))
            .map(|entry| entry.addr.clone())
            .ok_or(GameError::NoSuchGame)
    }

    pub fn contains(&self, game_id: GameId) -> bool {
        self.public_games.contains_key(&game_id) || self.private_games.contains_key(&game_id)
    }

    pub fn public_games(&self) -> Vec<GameListing> {
        let mut listing: Vec<GameListing> = self
            .public_games
            .iter()
            .map(|entry| GameListing {
                id: *entry.key(),
                players: entry.value().players.load(Ordering::Relaxed),
            })
            .collect();
        listing.sort_by_key(|game| game.id);
        listing
    }

    pub fn private_game_count(&self) -> usize {
        self.private_games.len()
    }

    pub fn game_count(&self) -> usize {
        self.public_games.len() + self.private_games.len()
    }

    /// Stops every session actor and empties both maps.
    pub fn shutdown(&self) {
        let total = self.game_count();
        for entry in self.public_games.iter().chain(self.private_games.iter()) {
            entry.value().addr.do_send(Shutdown);
        }
        self.public_games.clear();
        self.private_games.clear();
        info!(games = total, "[REGISTRY] shut down");
    }
}
