use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details_from_service_response;
use serde_json::json;
use tictactoe_backend::domain::ids::GameId;
use tictactoe_backend::AppState;

use crate::common::read_json;
use crate::support::app::test_config;
use crate::support::create_test_app;

#[actix_web::test]
async fn lobby_starts_empty() {
    let app = create_test_app(AppState::new(test_config())).await;

    let req = test::TestRequest::get().uri("/api/games").to_request();
    let body = read_json(test::call_service(&app, req).await).await;
    assert_eq!(body, json!({ "private": 0, "public": [] }));
}

#[actix_web::test]
async fn empty_post_creates_a_public_game() {
    let state = AppState::new(test_config());
    let registry = state.registry();
    let app = create_test_app(state).await;

    let req = test::TestRequest::post().uri("/api/games").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = read_json(resp).await;
    let game_id: GameId = body["game_id"]
        .as_str()
        .expect("game_id")
        .parse()
        .expect("uuid game id");
    assert!(registry.contains(game_id));

    let req = test::TestRequest::get().uri("/api/games").to_request();
    let lobby = read_json(test::call_service(&app, req).await).await;
    assert_eq!(lobby["private"], 0);
    assert_eq!(
        lobby["public"],
        json!([{ "id": game_id.to_string(), "players": 0 }])
    );
}

#[actix_web::test]
async fn private_games_are_only_counted() {
    let app = create_test_app(AppState::new(test_config())).await;

    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(json!({ "public": false, "config": { "max_players": 4 } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/games").to_request();
    let lobby = read_json(test::call_service(&app, req).await).await;
    assert_eq!(lobby, json!({ "private": 1, "public": [] }));
}

#[actix_web::test]
async fn invalid_body_is_a_problem_details_400() {
    let app = create_test_app(AppState::new(test_config())).await;

    let req = test::TestRequest::post()
        .uri("/api/games")
        .insert_header(("content-type", "application/json"))
        .set_payload("{ public: yes }")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details_from_service_response(
        resp,
        "BAD_REQUEST",
        StatusCode::BAD_REQUEST,
        Some("Invalid request body"),
    )
    .await;
}

#[actix_web::test]
async fn unknown_fields_are_rejected() {
    let app = create_test_app(AppState::new(test_config())).await;

    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(json!({ "public": true, "colour": "red" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let problem = assert_problem_details_from_service_response(
        resp,
        "BAD_REQUEST",
        StatusCode::BAD_REQUEST,
        Some("colour"),
    )
    .await;
    assert_eq!(problem.title, "Bad Request");
}

#[actix_web::test]
async fn oversized_board_is_accepted_and_capped() {
    let state = AppState::new(test_config());
    let registry = state.registry();
    let app = create_test_app(state).await;

    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(json!({ "config": { "board_size": 8_589_934_592u64, "win_run_length": 1_000_000 } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let tagged = resp.response().extensions().get::<GameId>().copied();
    let body = read_json(resp).await;
    let game_id: GameId = body["game_id"]
        .as_str()
        .expect("game_id")
        .parse()
        .expect("uuid game id");
    assert_eq!(tagged, Some(game_id));
    assert!(registry.contains(game_id));
}
