use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a peer inside a consultation room.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PeerRole {
    #[serde(rename = "doctor")]
    Doctor,
    #[serde(rename = "patient")]
    Patient,
}

/// A connected peer as tracked by the room registry.
#[derive(Debug, Clone)]
pub struct RoomPeer {
    pub id: Uuid,
    pub user_id: String,
    pub name: String,
    pub role: PeerRole,
}

impl RoomPeer {
    pub fn summary(&self) -> PeerSummary {
        PeerSummary {
            id: self.id,
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Wire-facing view of a peer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PeerSummary {
    pub id: Uuid,
    pub name: String,
    pub role: PeerRole,
}

/// Signaling messages exchanged over the relay, tagged `{type, payload}`.
///
/// Chat text and WebRTC negotiation payloads are relayed verbatim to the
/// other peers in the room; `room-joined`, `peer-joined` and `peer-left`
/// originate from the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum SignalMessage {
    ChatMessage {
        sender: String,
        text: String,
        sent_at: DateTime<Utc>,
    },
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    #[serde(rename_all = "camelCase")]
    IceCandidate {
        candidate: String,
        sdp_mid: Option<String>,
        sdp_m_line_index: Option<u32>,
    },
    LeaveRoom,
    RoomJoined {
        room_id: String,
        peers: Vec<PeerSummary>,
    },
    PeerJoined {
        peer: PeerSummary,
    },
    PeerLeft {
        peer_id: Uuid,
    },
}

/// Envelope broadcast inside a room: the originating peer plus the message.
/// Receivers drop frames whose `from` matches their own peer id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RelayFrame {
    pub from: Uuid,
    #[serde(flatten)]
    pub message: SignalMessage,
}

/// Wire-facing snapshot of a live room.
#[derive(Debug, Clone, Serialize)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub peers: Vec<PeerSummary>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SignalingError {
    #[error("Room {0} has no connected peers")]
    RoomEmpty(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
