use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::GameOptions;
use crate::domain::ids::GameId;
use crate::error::AppError;
use crate::state::app_state::AppState;
use crate::ws::hub::GameListing;

#[derive(Debug, Serialize)]
pub struct GamesResponse {
    pub private: usize,
    pub public: Vec<GameListing>,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateGameRequest {
    pub public: bool,
    pub config: Option<GameOptions>,
}

impl Default for CreateGameRequest {
    fn default() -> Self {
        Self {
            public: true,
            config: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateGameResponse {
    pub game_id: GameId,
}

async fn list_games(app_state: web::Data<AppState>) -> HttpResponse {
    let registry = app_state.registry();
    HttpResponse::Ok().json(GamesResponse {
        private: registry.private_game_count(),
        public: registry.public_games(),
    })
}

/// An empty body creates a public game with the server defaults.
async fn create_game(
    app_state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        CreateGameRequest::default()
    } else {
        serde_json::from_slice::<CreateGameRequest>(&body)
            .map_err(|err| AppError::bad_request(format!("Invalid request body: {err}")))?
    };

    let game_id = app_state
        .registry()
        .create(request.public, request.config)
        .await;
    info!(game_id = %game_id, public = request.public, "Game created over HTTP");

    let mut response = HttpResponse::Created().json(CreateGameResponse { game_id });
    // picked up by the request logger
    response.extensions_mut().insert(game_id);
    Ok(response)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_games))
            .route(web::post().to(create_game)),
    );
}
