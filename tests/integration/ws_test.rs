//! WebSocket integration tests using real connections against an in-process
//! axum server.

mod helpers;

use std::time::{Duration, Instant};

use serde_json::json;

use helpers::{
    RECV_TIMEOUT, TestServer, sync, ws_expect_close, ws_recv, ws_send, ws_send_raw,
};

#[tokio::test]
async fn test_event_reaches_only_its_user() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let (mut alice_tx, mut alice_rx) = server.connect_subscribed(1).await?;
    let (mut bob_tx, mut bob_rx) = server.connect_subscribed(2).await?;

    let delivered = server
        .engine
        .hub
        .publish_for_user(1, "notifications", "notification.created", json!({"id": "7"}))
        .await;
    assert_eq!(delivered, 1);

    let event = ws_recv(&mut alice_rx, RECV_TIMEOUT).await?;
    assert_eq!(
        event,
        json!({"event": "notification.created", "topic": "notifications", "data": {"id": "7"}})
    );

    // Bob's next frame is the sync reply, not the event.
    sync(&mut bob_tx, &mut bob_rx).await?;
    sync(&mut alice_tx, &mut alice_rx).await?;
    Ok(())
}

#[tokio::test]
async fn test_every_tab_of_a_user_receives_the_event() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let (_first_tx, mut first_rx) = server.connect_subscribed(5).await?;
    let (_second_tx, mut second_rx) = server.connect_subscribed(5).await?;

    let delivered = server
        .engine
        .hub
        .publish_for_user(5, "notifications", "notification.created", json!({"id": "1"}))
        .await;

    assert_eq!(delivered, 2);
    assert_eq!(ws_recv(&mut first_rx, RECV_TIMEOUT).await?["data"]["id"], "1");
    assert_eq!(ws_recv(&mut second_rx, RECV_TIMEOUT).await?["data"]["id"], "1");
    Ok(())
}

#[tokio::test]
async fn test_link_share_token_is_rejected_and_closed() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let (token, _) = server.encoder.generate_link_share_token(9)?;
    let (mut tx, mut rx) = server.connect().await?;

    ws_send(&mut tx, &json!({"action": "auth", "token": token})).await?;

    assert_eq!(ws_recv(&mut rx, RECV_TIMEOUT).await?, json!({"error": "invalid_token"}));
    ws_expect_close(&mut rx, RECV_TIMEOUT).await?;
    assert_eq!(server.engine.hub.connection_count().await, 0);
    assert_eq!(server.engine.metrics.snapshot().auth_failures, 1);
    Ok(())
}

#[tokio::test]
async fn test_garbage_token_is_rejected_and_closed() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let (mut tx, mut rx) = server.connect().await?;

    ws_send(&mut tx, &json!({"action": "auth", "token": "not-a-token"})).await?;

    assert_eq!(ws_recv(&mut rx, RECV_TIMEOUT).await?, json!({"error": "invalid_token"}));
    ws_expect_close(&mut rx, RECV_TIMEOUT).await?;
    Ok(())
}

#[tokio::test]
async fn test_api_token_authenticates() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let token = server.api_tokens.issue(11, chrono::Duration::hours(1)).await;
    let (mut tx, mut rx) = server.connect().await?;

    ws_send(&mut tx, &json!({"action": "auth", "token": token})).await?;

    assert_eq!(
        ws_recv(&mut rx, RECV_TIMEOUT).await?,
        json!({"action": "auth.success", "success": true})
    );
    server.wait_for_connections(1).await?;
    Ok(())
}

#[tokio::test]
async fn test_subscribe_before_auth_is_refused_but_connection_stays_open() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let (mut tx, mut rx) = server.connect().await?;

    ws_send(&mut tx, &json!({"action": "subscribe", "topic": "notifications"})).await?;
    assert_eq!(ws_recv(&mut rx, RECV_TIMEOUT).await?, json!({"error": "auth_required"}));

    ws_send(&mut tx, &json!({"action": "unsubscribe", "topic": "notifications"})).await?;
    assert_eq!(ws_recv(&mut rx, RECV_TIMEOUT).await?, json!({"error": "auth_required"}));

    ws_send(&mut tx, &json!({"action": "auth", "token": server.user_token(3)?})).await?;
    assert_eq!(ws_recv(&mut rx, RECV_TIMEOUT).await?["action"], "auth.success");
    Ok(())
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let (mut tx, mut rx) = server.connect().await?;

    ws_send_raw(&mut tx, "this is not json").await?;
    ws_send(&mut tx, &json!({"topic": "notifications"})).await?;
    ws_send(&mut tx, &json!({"action": "dance"})).await?;
    ws_send(&mut tx, &json!({"action": "auth", "token": server.user_token(4)?})).await?;

    assert_eq!(
        ws_recv(&mut rx, RECV_TIMEOUT).await?,
        json!({"action": "auth.success", "success": true})
    );
    Ok(())
}

#[tokio::test]
async fn test_second_auth_is_refused() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let (mut tx, mut rx) = server.connect_subscribed(6).await?;

    ws_send(&mut tx, &json!({"action": "auth", "token": server.user_token(7)?})).await?;

    assert_eq!(
        ws_recv(&mut rx, RECV_TIMEOUT).await?,
        json!({"error": "already_authenticated"})
    );
    server.wait_for_connections(1).await?;
    assert_eq!(server.engine.hub.user_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let (mut tx, mut rx) = server.connect_subscribed(8).await?;

    ws_send(&mut tx, &json!({"action": "unsubscribe", "topic": "notifications"})).await?;
    sync(&mut tx, &mut rx).await?;

    let delivered = server
        .engine
        .hub
        .publish_for_user(8, "notifications", "notification.created", json!({}))
        .await;

    assert_eq!(delivered, 0);
    sync(&mut tx, &mut rx).await?;
    Ok(())
}

#[tokio::test]
async fn test_disconnect_unregisters() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let (tx, rx) = server.connect_subscribed(12).await?;
    server.wait_for_connections(1).await?;

    drop(tx);
    drop(rx);

    server.wait_for_connections(0).await?;
    assert_eq!(
        server
            .engine
            .hub
            .publish_for_user(12, "notifications", "notification.created", json!({}))
            .await,
        0
    );
    Ok(())
}

#[tokio::test]
async fn test_shutdown_closes_open_connections() -> anyhow::Result<()> {
    let server = TestServer::spawn().await?;
    let (_tx, mut rx) = server.connect_subscribed(13).await?;

    server.engine.shutdown();

    ws_expect_close(&mut rx, RECV_TIMEOUT).await?;
    server.wait_for_connections(0).await?;
    Ok(())
}

#[tokio::test]
async fn test_stalled_reader_is_dropped_after_write_timeout() -> anyhow::Result<()> {
    let server = TestServer::spawn_with(|config| {
        config.realtime.write_timeout_seconds = 1;
    })
    .await?;
    // Held open but never read again, so the server's socket buffers fill.
    let (_tx, _rx) = server.connect_subscribed(14).await?;
    server.wait_for_connections(1).await?;

    let payload = json!({"body": "x".repeat(256 * 1024)});
    let started = Instant::now();
    while server.engine.hub.connection_count().await > 0 {
        anyhow::ensure!(
            started.elapsed() < Duration::from_secs(10),
            "stalled connection still registered after {:?}",
            started.elapsed()
        );
        server
            .engine
            .hub
            .publish_for_user(14, "notifications", "notification.created", payload.clone())
            .await;
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(server.engine.hub.user_count().await, 0);
    Ok(())
}
