use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tracing::{info, warn};
use uuid::Uuid;

use amen_types::events::{WallCommand, WallEvent};

use crate::dispatcher::Dispatcher;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Per-connection category filter. `None` until the client's first Subscribe;
/// until then every wall event is delivered.
type Subscriptions = Arc<std::sync::RwLock<Option<HashSet<String>>>>;

/// Handle a single WebSocket connection: Identify handshake, Ready event,
/// then the forward/receive loop.
pub async fn handle_connection(socket: WebSocket, dispatcher: Dispatcher, jwt_secret: String) {
    let (mut sender, mut receiver) = socket.split();

    // Step 1: Wait for Identify command with JWT
    let (user_id, name) = match wait_for_identify(&mut receiver, &jwt_secret).await {
        Some(id) => id,
        None => {
            warn!("WebSocket client failed to identify, closing");
            return;
        }
    };

    info!("{} ({}) connected to wall gateway", name, user_id);

    // Step 2: Send Ready event
    let ready = WallEvent::Ready {
        user_id,
        name: name.clone(),
    };
    if sender
        .send(Message::Text(serde_json::to_string(&ready).unwrap().into()))
        .await
        .is_err()
    {
        return;
    }

    let mut broadcast_rx = dispatcher.subscribe();

    let subscriptions: Subscriptions = Arc::new(std::sync::RwLock::new(None));
    let send_subscriptions = subscriptions.clone();

    // Shared flag for heartbeat
    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received.clone();

    // Forward wall events -> client, with heartbeat
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                result = broadcast_rx.recv() => {
                    let event = match result {
                        Ok(event) => event,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            warn!("Broadcast receiver lagged by {} events", n);
                            continue;
                        }
                        Err(_) => break,
                    };

                    if let Some(category) = event.category() {
                        let subs = send_subscriptions.read()
                            .expect("subscription lock poisoned");
                        if let Some(categories) = subs.as_ref() {
                            if !categories.contains(category) {
                                continue;
                            }
                        }
                    }

                    let text = serde_json::to_string(&event).unwrap();
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("Heartbeat timeout (missed {} pongs), dropping connection", missed_heartbeats);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Read commands from client
    let name_recv = name.clone();
    let recv_subscriptions = subscriptions.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    match serde_json::from_str::<WallCommand>(&text) {
                        Ok(WallCommand::Subscribe { categories }) => {
                            let mut subs = recv_subscriptions
                                .write()
                                .expect("subscription lock poisoned");
                            *subs = Some(categories.into_iter().collect());
                        }
                        // A second Identify after the handshake is harmless noise
                        Ok(WallCommand::Identify { .. }) => {}
                        Err(e) => {
                            warn!(
                                "{} ({}) bad command: {} -- raw: {}",
                                name_recv,
                                user_id,
                                e,
                                truncate_for_log(&text)
                            );
                        }
                    }
                }
                Message::Pong(_) => {
                    pong_flag_recv.store(true, Ordering::Release);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!("{} ({}) disconnected from wall gateway", name, user_id);
}

/// Clip a raw client message for logging. Cuts at a char boundary so
/// multibyte text never panics the recv task.
fn truncate_for_log(text: &str) -> &str {
    if text.len() <= MAX_LOGGED_COMMAND_BYTES {
        return text;
    }
    let mut end = MAX_LOGGED_COMMAND_BYTES;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

const MAX_LOGGED_COMMAND_BYTES: usize = 200;

async fn wait_for_identify(
    receiver: &mut futures_util::stream::SplitStream<WebSocket>,
    jwt_secret: &str,
) -> Option<(Uuid, String)> {
    use amen_types::api::Claims;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    let timeout = tokio::time::timeout(std::time::Duration::from_secs(10), async {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Text(text) = msg {
                if let Ok(WallCommand::Identify { token }) =
                    serde_json::from_str::<WallCommand>(&text)
                {
                    let token_data = decode::<Claims>(
                        &token,
                        &DecodingKey::from_secret(jwt_secret.as_bytes()),
                        &Validation::default(),
                    );

                    match token_data {
                        Ok(data) => return Some((data.claims.sub, data.claims.name)),
                        Err(e) => {
                            warn!("Gateway Identify with invalid token: {}", e);
                            return None;
                        }
                    }
                }
            }
        }
        None
    });

    timeout.await.ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::truncate_for_log;

    #[test]
    fn short_messages_pass_through() {
        assert_eq!(truncate_for_log("not json"), "not json");
    }

    #[test]
    fn long_ascii_clips_at_limit() {
        let text = "x".repeat(500);
        assert_eq!(truncate_for_log(&text).len(), 200);
    }

    #[test]
    fn multibyte_text_clips_on_a_char_boundary() {
        // 3 bytes per char, so byte 200 falls mid-character
        let text = "日".repeat(100);
        let clipped = truncate_for_log(&text);
        assert_eq!(clipped.len(), 198);
        assert!(clipped.chars().all(|c| c == '日'));
    }
}
