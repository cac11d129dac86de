use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use tictactoe_backend::middleware::cors::cors_middleware;
use tictactoe_backend::middleware::request_trace::RequestTrace;
use tictactoe_backend::middleware::structured_logger::StructuredLogger;
use tictactoe_backend::routes;
use tictactoe_backend::state::app_state::AppState;
use tictactoe_backend::ws::hub::GameRegistry;
use tictactoe_backend::ServerConfig;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid configuration: {}", e.detail());
            std::process::exit(1);
        }
    };

    println!(
        "🚀 Starting Tic-tac-toe Backend on http://{}:{}",
        config.host, config.port
    );

    let registry = Arc::new(GameRegistry::from_config(&config));
    spawn_janitor(registry.clone(), config.sweep_interval);

    let host = config.host.clone();
    let port = config.port;
    let data = web::Data::new(AppState::with_registry(config, registry.clone()));

    let result = HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await;

    registry.shutdown();
    result
}

/// Periodically drops sessions whose players are all gone for longer than
/// the inactivity grace.
fn spawn_janitor(registry: Arc<GameRegistry>, every: std::time::Duration) {
    actix_web::rt::spawn(async move {
        let mut ticker = actix_web::rt::time::interval(every);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            registry.sweep().await;
        }
    });
}
