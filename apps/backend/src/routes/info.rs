use actix_web::{web, HttpResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct GameInfo {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
}

pub const GAME_INFO: GameInfo = GameInfo {
    name: "tic_tac_toe",
    display_name: "Tic-tac-toe",
    description: "Real-time multiplayer tic-tac-toe on a board that grows with its players",
    version: env!("CARGO_PKG_VERSION"),
};

async fn info() -> HttpResponse {
    HttpResponse::Ok().json(&GAME_INFO)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/info", web::get().to(info));
}
