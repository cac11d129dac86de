// Errors reported to a single connection

use serde_json::{json, Value};
use tictactoe_backend::GameOptions;

use crate::support::websocket::start_test_server;
use crate::support::websocket_client::WebSocketClient;

fn message(envelope: &Value) -> &str {
    envelope["event"]["data"]["message"].as_str().unwrap_or_default()
}

#[actix_web::test]
async fn joining_an_unknown_game_fails() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server().await?;
    let mut client = WebSocketClient::connect(&server.ws_url()).await?;

    client
        .command(
            "join",
            json!({ "game_id": uuid::Uuid::new_v4(), "username": "ann" }),
        )
        .await?;
    let err = client.expect_event("error").await?;
    assert_eq!(err["origin"], "server");
    assert_eq!(message(&err), "The game does not exist.");

    client
        .command("spectate", json!({ "game_id": uuid::Uuid::new_v4() }))
        .await?;
    let err = client.expect_event("error").await?;
    assert_eq!(message(&err), "The game does not exist.");

    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn blank_username_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server().await?;
    let game_id = server.create_game(true, None).await;
    let mut client = WebSocketClient::connect(&server.ws_url()).await?;

    client
        .command("join", json!({ "game_id": game_id, "username": "   " }))
        .await?;
    let err = client.expect_event("error").await?;
    assert_eq!(message(&err), "The username must not be empty.");

    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn a_connection_plays_in_one_game_only() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server().await?;
    let first = server.create_game(true, None).await;
    let second = server.create_game(true, None).await;
    let mut client = WebSocketClient::connect(&server.ws_url()).await?;

    client.join(&first.to_string(), "ann").await?;
    client.expect_event("new_player").await?;

    client
        .command("join", json!({ "game_id": second, "username": "ann" }))
        .await?;
    let err = client.expect_event("error").await?;
    assert_eq!(
        message(&err),
        "This connection is already part of a game. Send 'leave' first."
    );

    client
        .command("spectate", json!({ "game_id": second }))
        .await?;
    client.expect_event("error").await?;

    // after leaving, the connection may join elsewhere
    client.command("leave", Value::Null).await?;
    client.expect_event("left").await?;
    client.join(&second.to_string(), "ann").await?;

    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn commands_right_after_join_are_not_lost() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server().await?;
    let game_id = server.create_game(true, None).await;
    let mut client = WebSocketClient::connect(&server.ws_url()).await?;

    // sent back to back, before the join is confirmed
    client
        .command("join", json!({ "game_id": game_id, "username": "ann" }))
        .await?;
    client.command("start", Value::Null).await?;

    client.expect_event("joined").await?;
    client.expect_event("new_player").await?;
    let refused = client.expect_event("forbidden_action").await?;
    assert!(message(&refused).starts_with("Not enough players"));

    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn full_and_started_games_turn_newcomers_away() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server().await?;
    let game_id = server.create_game(true, None).await;

    let mut ann = WebSocketClient::connect(&server.ws_url()).await?;
    ann.join(&game_id.to_string(), "ann").await?;
    let mut bob = WebSocketClient::connect(&server.ws_url()).await?;
    bob.join(&game_id.to_string(), "bob").await?;
    ann.wait_for("my_turn").await?;

    let mut cat = WebSocketClient::connect(&server.ws_url()).await?;
    cat.command("join", json!({ "game_id": game_id, "username": "cat" }))
        .await?;
    let err = cat.expect_event("error").await?;
    assert_eq!(message(&err), "The game is full.");
    ann.expect_silence().await?;

    // three seats, two taken, started by hand
    let roomy = server
        .create_game(
            true,
            Some(GameOptions {
                max_players: 3,
                ..GameOptions::default()
            }),
        )
        .await;
    let mut dan = WebSocketClient::connect(&server.ws_url()).await?;
    dan.join(&roomy.to_string(), "dan").await?;
    let mut eve = WebSocketClient::connect(&server.ws_url()).await?;
    eve.join(&roomy.to_string(), "eve").await?;
    dan.command("start", Value::Null).await?;
    let board = dan.wait_for("board").await?;
    assert_eq!(board["event"]["data"]["board"].as_array().map(Vec::len), Some(9));
    dan.wait_for("my_turn").await?;

    let mut fay = WebSocketClient::connect(&server.ws_url()).await?;
    fay.command("join", json!({ "game_id": roomy, "username": "fay" }))
        .await?;
    let err = fay.expect_event("error").await?;
    assert_eq!(message(&err), "The game has already started.");

    server.stop().await;
    Ok(())
}
