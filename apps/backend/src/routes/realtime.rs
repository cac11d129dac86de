use actix_web::web;

use crate::ws::session::upgrade;

/// `GET /ws` upgrades to a game connection. Joining, reconnecting and
/// spectating all happen over the socket afterwards.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/ws", web::get().to(upgrade));
}
