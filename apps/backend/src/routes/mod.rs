use actix_web::web;

pub mod games;
pub mod health;
pub mod info;
pub mod realtime;

/// Registers every route. `main.rs` and the integration tests share this so
/// both serve the same paths.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // /health
    cfg.configure(health::configure_routes);

    // /api/info, /api/games
    cfg.service(
        web::scope("/api")
            .configure(info::configure_routes)
            .service(web::scope("/games").configure(games::configure_routes)),
    );

    // /ws
    cfg.configure(realtime::configure_routes);
}
