//! The read and write tasks that drive one upgraded socket.
//!
//! The socket sink is shared behind a mutex: the write task drains the
//! outbound queue through it, and the read task uses it directly for the
//! handshake rejection and the final close frame.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, close_code};
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::{Mutex, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use taskhub_core::config::RealtimeConfig;

use super::handle::{Connection, Flow};
use crate::error::TransportError;
use crate::message::{IncomingMessage, OutgoingMessage};

type SharedSink = Arc<Mutex<SplitSink<WebSocket, Message>>>;

/// Runs a connection's read and write tasks until both have finished.
pub async fn serve(
    conn: Arc<Connection>,
    outbound: mpsc::Receiver<OutgoingMessage>,
    socket: WebSocket,
    config: &RealtimeConfig,
) {
    let (sink, stream) = socket.split();
    let sink: SharedSink = Arc::new(Mutex::new(sink));
    let write_timeout = config.write_timeout();

    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        outbound,
        Arc::clone(&sink),
        config.ping_interval(),
        write_timeout,
    ));
    let reader = tokio::spawn(read_loop(Arc::clone(&conn), stream, sink, write_timeout));

    let (read_result, write_result) = tokio::join!(reader, writer);
    if let Err(e) = read_result {
        warn!(conn_id = %conn.id, error = %e, "Read task failed");
    }
    if let Err(e) = write_result {
        warn!(conn_id = %conn.id, error = %e, "Write task failed");
    }

    // No-op unless the read task panicked before its cleanup.
    conn.release().await;

    info!(conn_id = %conn.id, "WebSocket connection closed");
}

async fn read_loop(
    conn: Arc<Connection>,
    mut stream: SplitStream<WebSocket>,
    sink: SharedSink,
    write_timeout: Duration,
) {
    loop {
        let frame = tokio::select! {
            _ = conn.cancel_token().cancelled() => break,
            frame = stream.next() => frame,
        };

        let parsed = match frame {
            Some(Ok(Message::Text(text))) => serde_json::from_str::<IncomingMessage>(text.as_str()),
            Some(Ok(Message::Binary(data))) => serde_json::from_slice::<IncomingMessage>(&data),
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Err(e)) => {
                debug!(conn_id = %conn.id, error = %e, "WebSocket read failed");
                break;
            }
        };

        // Malformed frames are ignored and the connection stays open.
        let msg = match parsed {
            Ok(msg) => msg,
            Err(e) => {
                debug!(conn_id = %conn.id, error = %e, "Ignoring malformed frame");
                continue;
            }
        };

        match conn.handle_message(msg).await {
            Flow::Continue => {}
            Flow::Close(reply) => {
                // Bypass the queue: the loop ends now and a queued reply
                // might never be flushed.
                if let Err(e) = write_message(&sink, &reply, write_timeout).await {
                    debug!(conn_id = %conn.id, error = %e, "Failed to deliver rejection");
                }
                break;
            }
        }
    }

    conn.release().await;
    close_socket(&sink, write_timeout).await;
}

async fn write_loop(
    conn: Arc<Connection>,
    mut outbound: mpsc::Receiver<OutgoingMessage>,
    sink: SharedSink,
    ping_interval: Duration,
    write_timeout: Duration,
) {
    let mut ping = tokio::time::interval_at(Instant::now() + ping_interval, ping_interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = conn.cancel_token().cancelled() => break,
            next = outbound.recv() => {
                let Some(msg) = next else { break };
                if let Err(e) = write_message(&sink, &msg, write_timeout).await {
                    debug!(conn_id = %conn.id, error = %e, "WebSocket write failed");
                    break;
                }
                conn.metrics().message_sent();
            }
            _ = ping.tick() => {
                if let Err(e) = write_frame(&sink, Message::Ping(Bytes::new()), write_timeout).await {
                    debug!(conn_id = %conn.id, error = %e, "WebSocket ping failed");
                    break;
                }
            }
        }
    }

    // Let the read task observe the failure and perform the close.
    conn.close();
}

async fn write_message(
    sink: &SharedSink,
    msg: &OutgoingMessage,
    timeout: Duration,
) -> Result<(), TransportError> {
    let text = serde_json::to_string(msg)?;
    write_frame(sink, Message::Text(text.into()), timeout).await
}

/// Sends one frame, bounding lock acquisition and the write together.
async fn write_frame(
    sink: &SharedSink,
    frame: Message,
    timeout: Duration,
) -> Result<(), TransportError> {
    let send = async {
        let mut sink = sink.lock().await;
        sink.send(frame).await
    };

    match tokio::time::timeout(timeout, send).await {
        Ok(result) => result.map_err(TransportError::from),
        Err(_) => Err(TransportError::Timeout(timeout)),
    }
}

async fn close_socket(sink: &SharedSink, timeout: Duration) {
    let frame = Message::Close(Some(CloseFrame {
        code: close_code::NORMAL,
        reason: Utf8Bytes::from_static(""),
    }));

    if let Err(e) = write_frame(sink, frame, timeout).await {
        debug!(error = %e, "Close frame not delivered");
    }

    let _ = tokio::time::timeout(timeout, async { sink.lock().await.close().await }).await;
}
