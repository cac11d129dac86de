// Reconnection with the player secret, and reaping of abandoned games

use std::time::Duration;

use serde_json::json;

use crate::support::websocket::start_test_server;
use crate::support::websocket_client::WebSocketClient;

#[actix_web::test]
async fn reconnect_within_grace_restores_the_seat() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server().await?;
    let game_id = server.create_game(true, None).await;

    let mut ann = WebSocketClient::connect(&server.ws_url()).await?;
    let (ann_id, _) = ann.join(&game_id.to_string(), "ann").await?;
    let mut bob = WebSocketClient::connect(&server.ws_url()).await?;
    let (bob_id, bob_secret) = bob.join(&game_id.to_string(), "bob").await?;
    ann.wait_for("my_turn").await?;
    bob.wait_for("opponents_turn").await?;

    ann.mark(4).await?;
    bob.wait_for("my_turn").await?;
    bob.close().await?;
    drop(bob);

    // well inside the 300ms grace
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(server.registry.sweep().await, 0);

    let mut again = WebSocketClient::connect(&server.ws_url()).await?;
    again
        .command(
            "connect",
            json!({ "game_id": game_id, "player_id": bob_id, "secret": bob_secret }),
        )
        .await?;

    let connected = again.expect_event("connected").await?;
    assert_eq!(connected["origin"], bob_id.as_str());
    assert_eq!(connected["event"]["data"]["username"], "bob");

    let board = again.expect_event("board").await?;
    assert_eq!(board["event"]["data"]["board"][4], ann_id.as_str());
    again.expect_event("my_turn").await?;

    // the restored seat plays on
    again.mark(0).await?;
    let marked = ann.wait_for("marked").await?;
    assert_eq!(marked["origin"], bob_id.as_str());
    ann.wait_for("my_turn").await?;

    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn one_player_on_two_connections_sees_everything_twice(
) -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server().await?;
    let game_id = server.create_game(true, None).await;

    let mut ann = WebSocketClient::connect(&server.ws_url()).await?;
    let (ann_id, ann_secret) = ann.join(&game_id.to_string(), "ann").await?;
    ann.expect_event("new_player").await?;

    let mut tab = WebSocketClient::connect(&server.ws_url()).await?;
    tab.command(
        "connect",
        json!({ "game_id": game_id, "player_id": ann_id, "secret": ann_secret }),
    )
    .await?;
    tab.expect_event("connected").await?;
    // no board before the round starts, only the queue head
    tab.expect_event("my_turn").await?;
    tab.expect_silence().await?;

    let mut bob = WebSocketClient::connect(&server.ws_url()).await?;
    bob.join(&game_id.to_string(), "bob").await?;

    ann.wait_for("my_turn").await?;
    tab.wait_for("my_turn").await?;

    // either connection may move for the player
    tab.mark(0).await?;
    let marked = ann.wait_for("marked").await?;
    assert_eq!(marked["origin"], ann_id.as_str());
    bob.wait_for("my_turn").await?;

    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn wrong_secret_is_refused_quietly() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server().await?;
    let game_id = server.create_game(true, None).await;

    let mut ann = WebSocketClient::connect(&server.ws_url()).await?;
    let (ann_id, _) = ann.join(&game_id.to_string(), "ann").await?;
    ann.expect_event("new_player").await?;

    let mut intruder = WebSocketClient::connect(&server.ws_url()).await?;
    intruder
        .command(
            "connect",
            json!({ "game_id": game_id, "player_id": ann_id, "secret": "guess" }),
        )
        .await?;
    let err = intruder.expect_event("error").await?;
    assert_eq!(err["origin"], "server");
    assert_eq!(err["event"]["data"]["message"], "The secret does not match.");
    ann.expect_silence().await?;

    // the refused connection is not bound to anything
    intruder.mark(0).await?;
    let err = intruder.expect_event("error").await?;
    assert_eq!(
        err["event"]["data"]["message"],
        "This connection is not playing in a game."
    );

    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn connect_to_unknown_player_fails() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server().await?;
    let game_id = server.create_game(true, None).await;

    let mut client = WebSocketClient::connect(&server.ws_url()).await?;
    client
        .command(
            "connect",
            json!({
                "game_id": game_id,
                "player_id": uuid::Uuid::new_v4(),
                "secret": "whatever"
            }),
        )
        .await?;
    let err = client.expect_event("error").await?;
    assert_eq!(
        err["event"]["data"]["message"],
        "The player does not exist in this game."
    );

    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn abandoned_game_is_reaped_after_grace() -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server().await?;
    let game_id = server.create_game(false, None).await;

    let mut ann = WebSocketClient::connect(&server.ws_url()).await?;
    let (ann_id, ann_secret) = ann.join(&game_id.to_string(), "ann").await?;
    ann.close().await?;
    drop(ann);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(server.registry.sweep().await, 1);
    assert!(!server.registry.contains(game_id));

    let mut late = WebSocketClient::connect(&server.ws_url()).await?;
    late.command(
        "connect",
        json!({ "game_id": game_id, "player_id": ann_id, "secret": ann_secret }),
    )
    .await?;
    let err = late.expect_event("error").await?;
    assert_eq!(err["event"]["data"]["message"], "The game does not exist.");

    server.stop().await;
    Ok(())
}

#[actix_web::test]
async fn closing_while_a_join_is_in_flight_leaves_no_ghost(
) -> Result<(), Box<dyn std::error::Error>> {
    let server = start_test_server().await?;
    let game_id = server.create_game(false, None).await;

    let mut ghost = WebSocketClient::connect(&server.ws_url()).await?;
    ghost
        .command("join", json!({ "game_id": game_id, "username": "ghost" }))
        .await?;
    ghost.close().await?;
    drop(ghost);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(server.registry.sweep().await, 1);
    assert!(!server.registry.contains(game_id));

    server.stop().await;
    Ok(())
}
