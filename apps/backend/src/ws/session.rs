use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{debug, info, warn};

use crate::domain::ids::{ConnId, GameId, PlayerId};
use crate::errors::GameError;
use crate::logging::security;
use crate::protocol::{
    parse_command, Command, DeliveryError, Envelope, Event, EventSink, GameCommand, Origin,
};
use crate::state::app_state::AppState;
use crate::ws::game::{Disconnect, GameActor, Play};
use crate::ws::hub::GameRegistry;

const MALFORMED_REPORT_EVERY: u32 = 10;
/// Outbound events queued per connection before delivery starts failing.
const OUTBOUND_CAPACITY: usize = 256;

/// An event on its way from a session to this connection.
#[derive(Message)]
#[rtype(result = "()")]
pub struct Outbound(pub Envelope);

/// Sessions hold connections as sinks; delivery never waits on the socket.
impl EventSink for Recipient<Outbound> {
    fn deliver(&self, envelope: Envelope) -> Result<(), DeliveryError> {
        self.try_send(Outbound(envelope)).map_err(|err| match err {
            SendError::Full(_) => DeliveryError::Full,
            SendError::Closed(_) => DeliveryError::Closed,
        })
    }
}

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let config = app_state.config();
    let conn_id = ConnId::new();
    let session = WsSession::new(
        conn_id,
        app_state.registry(),
        config.heartbeat_interval,
        config.client_timeout,
    );
    let mut response = ws::start(session, &req, stream)?;
    response.extensions_mut().insert(conn_id);
    Ok(response)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Player(PlayerId),
    Spectator,
}

struct Binding {
    game_id: GameId,
    role: Role,
    addr: Addr<GameActor>,
}

pub struct WsSession {
    conn_id: ConnId,
    registry: Arc<GameRegistry>,
    binding: Option<Binding>,

    // join/connect/spectate in flight; commands wait in `deferred`
    pending: Option<GameId>,
    deferred: Vec<Command>,
    malformed: u32,

    heartbeat_interval: Duration,
    client_timeout: Duration,
    last_heartbeat: Instant,
}

impl WsSession {
    pub fn new(
        conn_id: ConnId,
        registry: Arc<GameRegistry>,
        heartbeat_interval: Duration,
        client_timeout: Duration,
    ) -> Self {
        Self {
            conn_id,
            registry,
            binding: None,
            pending: None,
            deferred: Vec::new(),
            malformed: 0,
            heartbeat_interval,
            client_timeout,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, envelope: &Envelope) {
        match serde_json::to_string(envelope) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn send_error(ctx: &mut ws::WebsocketContext<Self>, message: impl Into<String>) {
        Self::send_json(ctx, &Envelope::error(message));
    }

    fn sink(ctx: &mut ws::WebsocketContext<Self>) -> Box<dyn EventSink> {
        Box::new(ctx.address().recipient::<Outbound>())
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let timeout = self.client_timeout;
        ctx.run_interval(self.heartbeat_interval, move |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > timeout {
                warn!(conn_id = %actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }

    fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        match parse_command(text) {
            Ok(command) => self.dispatch(command, ctx),
            Err(err) => {
                self.malformed += 1;
                debug!(conn_id = %self.conn_id, error = %err, "[WS SESSION] rejected malformed message");
                if self.malformed % MALFORMED_REPORT_EVERY == 0 {
                    security::malformed_frames(self.conn_id, self.malformed);
                }
                Self::send_error(ctx, err.to_string());
            }
        }
    }

    fn dispatch(&mut self, command: Command, ctx: &mut ws::WebsocketContext<Self>) {
        if self.pending.is_some() {
            self.deferred.push(command);
            return;
        }

        if let Some(game_command) = command.as_game_command() {
            self.play(game_command, ctx);
            return;
        }

        match command {
            Command::Join { game_id, username } => {
                if self.reject_if_bound(ctx) {
                    return;
                }
                let registry = self.registry.clone();
                let conn_id = self.conn_id;
                let sink = Self::sink(ctx);
                self.await_binding(
                    async move {
                        let (addr, player_id) =
                            registry.join(game_id, conn_id, username, sink).await?;
                        Ok((addr, Role::Player(player_id)))
                    },
                    game_id,
                    ctx,
                );
            }
            Command::Connect {
                game_id,
                player_id,
                secret,
            } => {
                if self.reject_if_bound(ctx) {
                    return;
                }
                let registry = self.registry.clone();
                let conn_id = self.conn_id;
                let sink = Self::sink(ctx);
                self.await_binding(
                    async move {
                        let result = registry
                            .connect(game_id, player_id, secret, conn_id, sink)
                            .await;
                        if let Err(err) = &result {
                            security::reconnect_rejected(game_id, player_id, conn_id, err);
                        }
                        Ok((result?, Role::Player(player_id)))
                    },
                    game_id,
                    ctx,
                );
            }
            Command::Spectate { game_id } => {
                if self.reject_if_bound(ctx) {
                    return;
                }
                let registry = self.registry.clone();
                let conn_id = self.conn_id;
                let sink = Self::sink(ctx);
                self.await_binding(
                    async move {
                        let addr = registry.spectate(game_id, conn_id, sink).await?;
                        Ok((addr, Role::Spectator))
                    },
                    game_id,
                    ctx,
                );
            }
            Command::Leave => self.leave(ctx),
            Command::Start | Command::Mark { .. } => {}
        }
    }

    fn reject_if_bound(&self, ctx: &mut ws::WebsocketContext<Self>) -> bool {
        if self.binding.is_some() {
            Self::send_error(ctx, GameError::AlreadyInGame.to_string());
            return true;
        }
        false
    }

    /// Runs a join-like request and binds the connection on success.
    /// Commands received meanwhile are replayed once it settles.
    fn await_binding<F>(&mut self, request: F, game_id: GameId, ctx: &mut ws::WebsocketContext<Self>)
    where
        F: std::future::Future<Output = Result<(Addr<GameActor>, Role), GameError>> + 'static,
    {
        self.pending = Some(game_id);
        ctx.spawn(request.into_actor(self).map(move |res, actor, ctx| {
            actor.pending = None;
            match res {
                Ok((addr, role)) => {
                    info!(
                        conn_id = %actor.conn_id,
                        game_id = %game_id,
                        role = ?role,
                        "[WS SESSION] bound to game"
                    );
                    actor.binding = Some(Binding {
                        game_id,
                        role,
                        addr,
                    });
                }
                Err(err) => Self::send_error(ctx, err.to_string()),
            }
            for command in std::mem::take(&mut actor.deferred) {
                actor.dispatch(command, ctx);
            }
        }));
    }

    fn play(&mut self, command: GameCommand, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(binding) = &self.binding else {
            Self::send_error(ctx, GameError::NotInGame.to_string());
            return;
        };
        let Role::Player(player_id) = binding.role else {
            Self::send_error(ctx, GameError::NotInGame.to_string());
            return;
        };

        let request = binding.addr.send(Play {
            player_id,
            command,
        });
        ctx.spawn(request.into_actor(self).map(|res, actor, ctx| match res {
            // rule violations were already reported by the session itself
            Ok(Ok(())) | Ok(Err(GameError::ForbiddenAction(_)))
            | Ok(Err(GameError::NotYourTurn { .. })) => {}
            Ok(Err(err)) => {
                Self::send_error(ctx, err.to_string());
                actor.binding = None;
            }
            Err(_) => {
                Self::send_error(ctx, GameError::NoSuchGame.to_string());
                actor.binding = None;
            }
        }));
    }

    fn leave(&mut self, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(binding) = self.binding.take() else {
            Self::send_error(ctx, GameError::NotInGame.to_string());
            return;
        };
        match binding.role {
            Role::Spectator => binding.addr.do_send(Disconnect {
                conn_id: self.conn_id,
            }),
            Role::Player(player_id) => {
                let registry = self.registry.clone();
                let game_id = binding.game_id;
                ctx.spawn(
                    async move { registry.leave(game_id, player_id).await }
                        .into_actor(self)
                        .map(|res, _actor, ctx| {
                            if let Err(err) = res {
                                Self::send_error(ctx, err.to_string());
                            }
                        }),
                );
            }
        }
    }
}

impl Actor for WsSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        info!(conn_id = %self.conn_id, "[WS SESSION] started");
        ctx.set_mailbox_capacity(OUTBOUND_CAPACITY);
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(binding) = self.binding.take() {
            binding.addr.do_send(Disconnect {
                conn_id: self.conn_id,
            });
        }
        // a bind still in flight may land after this; unbind it there too
        if let Some(game_id) = self.pending.take() {
            self.registry.disconnect(game_id, self.conn_id);
        }
        info!(conn_id = %self.conn_id, "[WS SESSION] stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for WsSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
                Self::send_error(ctx, "Binary messages are not supported.");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = %self.conn_id, error = %err, "[WS SESSION] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for WsSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) -> Self::Result {
        let envelope = msg.0;
        // another connection of this player left the game
        if let (Event::Left, Origin::Player(origin)) = (&envelope.event, envelope.origin) {
            if matches!(&self.binding, Some(b) if b.role == Role::Player(origin)) {
                self.binding = None;
            }
        }
        Self::send_json(ctx, &envelope);
    }
}
