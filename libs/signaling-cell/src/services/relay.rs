use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::auth::User;

use crate::handlers::SignalingState;
use crate::models::{PeerRole, RelayFrame, RoomPeer, SignalMessage};

/// Drive one WebSocket connection for its lifetime: join the room, forward
/// room traffic to the socket, fan inbound signals out to the other peers,
/// and tear the membership down on every exit path.
pub async fn run_session(state: Arc<SignalingState>, socket: WebSocket, room_id: String, user: User) {
    let peer_id = Uuid::new_v4();
    let role = if user.is_doctor() {
        PeerRole::Doctor
    } else {
        PeerRole::Patient
    };
    let peer = RoomPeer {
        id: peer_id,
        user_id: user.id.clone(),
        name: user.email.clone().unwrap_or_else(|| user.id.clone()),
        role,
    };
    let peer_summary = peer.summary();

    let (mut receiver_rx, existing_peers) = state.registry.join(&room_id, peer).await;

    let (mut socket_tx, mut socket_rx) = socket.split();

    // Greet the joining peer with the current room membership.
    let greeting = RelayFrame {
        from: peer_id,
        message: SignalMessage::RoomJoined {
            room_id: room_id.clone(),
            peers: existing_peers,
        },
    };
    match serde_json::to_string(&greeting) {
        Ok(text) => {
            if socket_tx.send(Message::Text(text.into())).await.is_err() {
                state.registry.leave(&room_id, peer_id).await;
                return;
            }
        }
        Err(e) => {
            warn!("Failed to serialize room greeting: {}", e);
            state.registry.leave(&room_id, peer_id).await;
            return;
        }
    }

    // Announce arrival to the peers already in the room.
    let _ = state
        .registry
        .broadcast(
            &room_id,
            &RelayFrame {
                from: peer_id,
                message: SignalMessage::PeerJoined { peer: peer_summary },
            },
        )
        .await;

    info!("Peer {} connected to signaling room {}", peer_id, room_id);

    // Forward room traffic to this socket, skipping the peer's own frames.
    let forward_task = tokio::spawn(async move {
        loop {
            match receiver_rx.recv().await {
                Ok(text) => {
                    if let Ok(frame) = serde_json::from_str::<RelayFrame>(&text) {
                        if frame.from == peer_id {
                            continue;
                        }
                    }
                    if socket_tx.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                // Last message wins: a slow consumer just skips ahead.
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Peer {} lagged, skipped {} frames", peer_id, skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Inbound loop: relay chat and WebRTC negotiation to the room.
    while let Some(Ok(message)) = socket_rx.next().await {
        match message {
            Message::Text(text) => match serde_json::from_str::<SignalMessage>(text.as_str()) {
                Ok(SignalMessage::LeaveRoom) => break,
                Ok(
                    signal @ (SignalMessage::ChatMessage { .. }
                    | SignalMessage::Offer { .. }
                    | SignalMessage::Answer { .. }
                    | SignalMessage::IceCandidate { .. }),
                ) => {
                    let frame = RelayFrame {
                        from: peer_id,
                        message: signal,
                    };
                    if let Err(e) = state.registry.broadcast(&room_id, &frame).await {
                        debug!("Relay failed for peer {}: {}", peer_id, e);
                    }
                }
                Ok(other) => {
                    debug!("Ignoring server-originated message from peer {}: {:?}", peer_id, other);
                }
                Err(e) => {
                    warn!("Unparseable signal from peer {}: {}", peer_id, e);
                }
            },
            Message::Close(_) => break,
            // Ping/pong and binary frames carry no signaling payload.
            _ => {}
        }
    }

    // Single teardown path for every way the session can end.
    forward_task.abort();
    state.registry.leave(&room_id, peer_id).await;
    let _ = state
        .registry
        .broadcast(
            &room_id,
            &RelayFrame {
                from: peer_id,
                message: SignalMessage::PeerLeft { peer_id },
            },
        )
        .await;

    info!("Peer {} disconnected from signaling room {}", peer_id, room_id);
}
