//! Turn-based session state machine.
//!
//! A `Session` owns one grid, the roster in join order, the FIFO turn queue
//! and the passive spectators. It is not synchronized; exactly one owner
//! (the game actor) drives it, one operation at a time. Every failing
//! operation returns before mutating anything.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::GameOptions;
use crate::domain::grid::{Field, Grid};
use crate::domain::ids::{ConnId, GameId, PlayerId};
use crate::domain::player::{deliver, Player};
use crate::domain::secret::Secret;
use crate::errors::GameError;
use crate::protocol::{Envelope, Event, EventSink, FinishResult, GameCommand, Origin};

const STOPPED: &str =
    "The game is currently stopped. Send the 'start' command to start or restart the game.";
const ALREADY_RUNNING: &str = "The game is already in progress.";
const FIELD_TAKEN: &str = "The field has already been marked by another player.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    InProgress,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Continue { next: PlayerId },
    Won { winner: PlayerId },
    Draw,
}

pub struct Session {
    id: GameId,
    options: GameOptions,
    state: SessionState,
    roster: Vec<Player>,
    turns: VecDeque<PlayerId>,
    grid: Grid<PlayerId>,
    spectators: HashMap<ConnId, Box<dyn EventSink>>,
    created_at: Instant,
}

impl Session {
    pub fn new(id: GameId, options: GameOptions, now: Instant) -> Self {
        let options = options.sanitized();
        Self {
            id,
            options,
            state: SessionState::Open,
            roster: Vec::new(),
            turns: VecDeque::new(),
            grid: Grid::new(options.win_run_length),
            spectators: HashMap::new(),
            created_at: now,
        }
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn grid(&self) -> &Grid<PlayerId> {
        &self.grid
    }

    pub fn player_count(&self) -> usize {
        self.roster.len()
    }

    pub fn spectator_count(&self) -> usize {
        self.spectators.len()
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.roster.iter().find(|p| p.id() == player_id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.roster.iter()
    }

    pub fn turn_order(&self) -> Vec<PlayerId> {
        self.turns.iter().copied().collect()
    }

    pub fn current_turn(&self) -> Option<PlayerId> {
        self.turns.front().copied()
    }

    /// Moves the head of the queue to its tail and returns the new head.
    pub fn next_turn(&mut self) -> Option<PlayerId> {
        if let Some(head) = self.turns.pop_front() {
            self.turns.push_back(head);
        }
        self.current_turn()
    }

    /// Seats a new player bound to `conn_id`. The connection receives
    /// `joined` with the reconnection secret, then everyone learns about the
    /// newcomer. Reaching `max_players` starts the round.
    pub fn add_player(
        &mut self,
        username: &str,
        conn_id: ConnId,
        sink: Box<dyn EventSink>,
    ) -> Result<PlayerId, GameError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(GameError::InvalidUsername);
        }
        if self.roster.len() >= self.options.max_players {
            return Err(GameError::GameFull);
        }
        if self.state != SessionState::Open {
            return Err(GameError::AlreadyStarted);
        }

        let (mut player, secret) = Player::new(username.to_string(), conn_id, sink);
        let player_id = player.id();
        player.emit_to(conn_id, Envelope::new(player_id, Event::Joined { secret }));
        self.roster.push(player);
        self.turns.push_back(player_id);

        info!(
            game_id = %self.id,
            player_id = %player_id,
            players = self.roster.len(),
            "[GAME] player joined"
        );
        self.broadcast(
            player_id,
            Event::NewPlayer {
                username: username.to_string(),
            },
            None,
        );

        if self.roster.len() == self.options.max_players {
            self.start(player_id)?;
        }
        Ok(player_id)
    }

    /// Removes a player. Everyone, the leaving player included, sees `left`.
    /// Falling under `min_players` reopens the session.
    pub fn remove_player(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        let pos = self
            .roster
            .iter()
            .position(|p| p.id() == player_id)
            .ok_or(GameError::NoSuchPlayer)?;
        let head_before = self.current_turn();

        self.broadcast(player_id, Event::Left, None);
        self.roster.remove(pos);
        self.turns.retain(|id| *id != player_id);

        info!(
            game_id = %self.id,
            player_id = %player_id,
            players = self.roster.len(),
            "[GAME] player left"
        );

        if self.roster.len() < self.options.min_players {
            if self.state != SessionState::Open {
                info!(game_id = %self.id, "[GAME] not enough players, session reopened");
            }
            self.state = SessionState::Open;
        } else if self.state == SessionState::InProgress && self.current_turn() != head_before {
            self.announce_turn(player_id);
        }
        Ok(())
    }

    /// Starts a round, or restarts one after it finished. A restart hands
    /// the first move to the next player in the queue.
    pub fn start(&mut self, initiator: PlayerId) -> Result<(), GameError> {
        if self.state == SessionState::InProgress {
            return Err(GameError::forbidden(ALREADY_RUNNING));
        }
        if self.roster.len() < self.options.min_players {
            return Err(GameError::forbidden(format!(
                "Not enough players to start. {} players are required.",
                self.options.min_players
            )));
        }
        if self.state == SessionState::Finished {
            self.next_turn();
        }

        let side_length = self.options.side_length_for(self.roster.len());
        self.grid.reset_and_resize(side_length);
        self.state = SessionState::InProgress;

        info!(
            game_id = %self.id,
            initiator = %initiator,
            side_length,
            win_run_length = self.grid.win_run_length(),
            "[GAME] round started"
        );

        self.broadcast_board(initiator);
        self.broadcast(initiator, Event::Started, None);
        self.announce_turn(initiator);
        Ok(())
    }

    /// Marks `field` for `player_id`. Either the grid changes and the
    /// resulting events are broadcast, or nothing changes at all.
    pub fn mark(&mut self, field: i64, player_id: PlayerId) -> Result<MarkOutcome, GameError> {
        if self.state != SessionState::InProgress {
            return Err(GameError::forbidden(STOPPED));
        }
        let current = self
            .current_turn()
            .ok_or_else(|| GameError::forbidden(STOPPED))?;
        if current != player_id {
            return Err(GameError::NotYourTurn { current });
        }

        let Ok(index) = usize::try_from(field) else {
            return Err(self.out_of_bounds());
        };
        if !self.grid.mark(index, player_id) {
            return Err(match self.grid.get_field(index, 0, 0) {
                Field::OutOfBounds => self.out_of_bounds(),
                Field::Owner(_) | Field::Unmarked => GameError::forbidden(FIELD_TAKEN),
            });
        }

        debug!(game_id = %self.id, player_id = %player_id, field = index, "[GAME] field marked");
        self.broadcast(player_id, Event::Marked { field: index }, None);
        self.broadcast_board(player_id);

        if self.grid.is_winning_mark(&player_id, index) {
            self.state = SessionState::Finished;
            info!(game_id = %self.id, winner = %player_id, "[GAME] round won");
            self.emit_to_player(
                player_id,
                player_id,
                Event::Finish {
                    result: FinishResult::Winner,
                    winner: Some(player_id),
                },
            );
            self.broadcast(
                player_id,
                Event::Finish {
                    result: FinishResult::Looser,
                    winner: Some(player_id),
                },
                Some(player_id),
            );
            return Ok(MarkOutcome::Won { winner: player_id });
        }

        if self.grid.is_draw() {
            self.state = SessionState::Finished;
            info!(game_id = %self.id, "[GAME] round drawn");
            self.broadcast(
                player_id,
                Event::Finish {
                    result: FinishResult::Draw,
                    winner: None,
                },
                None,
            );
            return Ok(MarkOutcome::Draw);
        }

        let next = self.next_turn().unwrap_or(player_id);
        self.announce_turn(player_id);
        Ok(MarkOutcome::Continue { next })
    }

    /// Runs a player command and reports a failure to that player only.
    pub fn handle_command(
        &mut self,
        player_id: PlayerId,
        command: GameCommand,
    ) -> Result<(), GameError> {
        if self.player(player_id).is_none() {
            return Err(GameError::NoSuchPlayer);
        }
        let result = match command {
            GameCommand::Start => self.start(player_id),
            GameCommand::Mark { field } => self.mark(field, player_id).map(|_| ()),
        };
        if let Err(err) = &result {
            self.notify_failure(player_id, err);
        }
        result
    }

    fn notify_failure(&mut self, player_id: PlayerId, err: &GameError) {
        let event = match err {
            GameError::ForbiddenAction(message) => Event::ForbiddenAction {
                message: message.clone(),
            },
            GameError::NotYourTurn { current } => Event::OpponentsTurn { player: *current },
            other => Event::Error {
                message: other.to_string(),
            },
        };
        self.emit_to_player(player_id, player_id, event);
    }

    /// Binds another connection to an existing player after checking its
    /// secret, then brings that connection up to date.
    pub fn connect(
        &mut self,
        player_id: PlayerId,
        secret: &Secret,
        conn_id: ConnId,
        sink: Box<dyn EventSink>,
    ) -> Result<(), GameError> {
        let pos = self
            .roster
            .iter()
            .position(|p| p.id() == player_id)
            .ok_or(GameError::NoSuchPlayer)?;
        if !self.roster[pos].verify_secret(secret) {
            return Err(GameError::InvalidSecret);
        }
        self.roster[pos].bind(conn_id, sink);

        let mut catch_up = vec![Event::Connected {
            username: self.roster[pos].username().to_string(),
        }];
        if self.state != SessionState::Open {
            catch_up.push(self.board_event());
        }
        if let Some(turn) = self.turn_event_for(Some(player_id)) {
            catch_up.push(turn);
        }

        info!(
            game_id = %self.id,
            player_id = %player_id,
            conn_id = %conn_id,
            connections = self.roster[pos].connection_count(),
            "[GAME] player reconnected"
        );
        let player = &mut self.roster[pos];
        for event in catch_up {
            player.emit_to(conn_id, Envelope::new(player_id, event));
        }
        Ok(())
    }

    /// Adds a passive observer that receives every broadcast. A connection
    /// that is already closed is not attached.
    pub fn spectate(&mut self, conn_id: ConnId, sink: Box<dyn EventSink>) {
        let mut catch_up = Vec::new();
        if self.state != SessionState::Open {
            catch_up.push(self.board_event());
            if self.state == SessionState::InProgress {
                catch_up.extend(self.turn_event_for(None));
            }
        }
        for event in catch_up {
            if !deliver(conn_id, sink.as_ref(), Envelope::server(event)) {
                return;
            }
        }
        self.spectators.insert(conn_id, sink);
        debug!(game_id = %self.id, conn_id = %conn_id, "[GAME] spectator attached");
    }

    /// Unbinds a connection, player or spectator. Returns the player it was
    /// bound to, if any.
    pub fn disconnect(&mut self, conn_id: ConnId, now: Instant) -> Option<PlayerId> {
        for player in &mut self.roster {
            if player.unbind(conn_id, now) {
                debug!(
                    game_id = %self.id,
                    player_id = %player.id(),
                    remaining = player.connection_count(),
                    "[GAME] connection unbound"
                );
                return Some(player.id());
            }
        }
        self.spectators.remove(&conn_id);
        None
    }

    /// A session is active while any player is; an empty session counts as
    /// active for `grace` after creation.
    pub fn is_active(&self, now: Instant, grace: Duration) -> bool {
        if self.roster.is_empty() {
            return now.saturating_duration_since(self.created_at) < grace;
        }
        self.roster.iter().any(|p| p.active(now, grace))
    }

    fn out_of_bounds(&self) -> GameError {
        GameError::forbidden(format!(
            "The field index is out of bounds. Must be greater than or equal to 0 and less than {}.",
            self.grid.len()
        ))
    }

    fn board_event(&self) -> Event {
        Event::Board {
            board: self.grid.cells().to_vec(),
        }
    }

    fn turn_event_for(&self, viewer: Option<PlayerId>) -> Option<Event> {
        let head = self.current_turn()?;
        Some(if viewer == Some(head) {
            Event::MyTurn
        } else {
            Event::OpponentsTurn { player: head }
        })
    }

    fn announce_turn(&mut self, origin: PlayerId) {
        if let Some(head) = self.current_turn() {
            self.emit_to_player(head, origin, Event::MyTurn);
            self.broadcast(origin, Event::OpponentsTurn { player: head }, Some(head));
        }
    }

    fn broadcast_board(&mut self, origin: PlayerId) {
        let board = self.board_event();
        self.broadcast(origin, board, None);
    }

    fn emit_to_player(&mut self, player_id: PlayerId, origin: PlayerId, event: Event) {
        if let Some(player) = self.roster.iter_mut().find(|p| p.id() == player_id) {
            player.emit(&Envelope::new(origin, event));
        }
    }

    /// Delivers to every player except `except`, and to all spectators.
    /// Closed connections are dropped along the way.
    fn broadcast(&mut self, origin: impl Into<Origin>, event: Event, except: Option<PlayerId>) {
        let envelope = Envelope::new(origin, event);
        for player in self.roster.iter_mut().filter(|p| Some(p.id()) != except) {
            player.emit(&envelope);
        }
        self.spectators
            .retain(|conn_id, sink| deliver(*conn_id, &**sink, envelope.clone()));
    }
}
