use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{PeerSummary, RelayFrame, RoomPeer, RoomSnapshot, SignalingError};

const ROOM_CHANNEL_CAPACITY: usize = 100;

struct SignalRoom {
    sender: broadcast::Sender<String>,
    peers: HashMap<Uuid, RoomPeer>,
    created_at: DateTime<Utc>,
}

/// In-process registry of live signaling rooms, keyed by consultation id.
///
/// A room is created when its first peer joins and dropped when its last
/// peer leaves. Frames are fanned out over a broadcast channel; nothing is
/// queued or persisted, and frames relayed into an empty room are lost.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, SignalRoom>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    /// Add a peer to a room, creating the room on first join. Returns the
    /// peer's subscription and a snapshot of the peers already present.
    pub async fn join(
        &self,
        room_id: &str,
        peer: RoomPeer,
    ) -> (broadcast::Receiver<String>, Vec<PeerSummary>) {
        let mut rooms = self.rooms.write().await;

        let room = rooms.entry(room_id.to_string()).or_insert_with(|| {
            info!("Creating signaling room {}", room_id);
            let (sender, _) = broadcast::channel(ROOM_CHANNEL_CAPACITY);
            SignalRoom {
                sender,
                peers: HashMap::new(),
                created_at: Utc::now(),
            }
        });

        let existing = room.peers.values().map(RoomPeer::summary).collect();
        let receiver = room.sender.subscribe();

        debug!(
            "Peer {} ({}) joined room {} ({} peers now)",
            peer.id,
            peer.name,
            room_id,
            room.peers.len() + 1
        );
        room.peers.insert(peer.id, peer);

        (receiver, existing)
    }

    /// Remove a peer; drops the room when it becomes empty. Returns true
    /// when the room was removed.
    pub async fn leave(&self, room_id: &str, peer_id: Uuid) -> bool {
        let mut rooms = self.rooms.write().await;

        if let Some(room) = rooms.get_mut(room_id) {
            room.peers.remove(&peer_id);
            debug!(
                "Peer {} left room {} ({} peers remain)",
                peer_id,
                room_id,
                room.peers.len()
            );

            if room.peers.is_empty() {
                rooms.remove(room_id);
                info!("Removing empty signaling room {}", room_id);
                return true;
            }
        }

        false
    }

    /// Fan a frame out to every subscriber of the room. A frame sent to a
    /// room with no other listeners is dropped, not queued.
    pub async fn broadcast(&self, room_id: &str, frame: &RelayFrame) -> Result<(), SignalingError> {
        let message = serde_json::to_string(frame)?;

        let rooms = self.rooms.read().await;
        match rooms.get(room_id) {
            Some(room) => {
                if let Err(e) = room.sender.send(message) {
                    // No live receivers; consistent with the relay's
                    // fire-and-forget semantics.
                    debug!("Dropped frame for room {}: {}", room_id, e);
                }
                Ok(())
            }
            None => Err(SignalingError::RoomEmpty(room_id.to_string())),
        }
    }

    pub async fn peer_count(&self, room_id: &str) -> usize {
        let rooms = self.rooms.read().await;
        rooms.get(room_id).map(|room| room.peers.len()).unwrap_or(0)
    }

    pub async fn snapshots(&self) -> Vec<RoomSnapshot> {
        let rooms = self.rooms.read().await;
        rooms
            .iter()
            .map(|(room_id, room)| RoomSnapshot {
                room_id: room_id.clone(),
                peers: room.peers.values().map(RoomPeer::summary).collect(),
                created_at: room.created_at,
            })
            .collect()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
