use assert_matches::assert_matches;
use chrono::Utc;
use uuid::Uuid;

use signaling_cell::models::{
    PeerRole, RelayFrame, RoomPeer, SignalMessage, SignalingError,
};
use signaling_cell::services::room::RoomRegistry;

fn peer(name: &str, role: PeerRole) -> RoomPeer {
    RoomPeer {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        role,
    }
}

#[tokio::test]
async fn join_creates_room_and_reports_existing_peers() {
    let registry = RoomRegistry::new();

    let doctor = peer("doctor@example.com", PeerRole::Doctor);
    let (_rx, existing) = registry.join("consult-1", doctor.clone()).await;
    assert!(existing.is_empty());
    assert_eq!(registry.peer_count("consult-1").await, 1);

    let patient = peer("patient@example.com", PeerRole::Patient);
    let (_rx2, existing) = registry.join("consult-1", patient).await;
    assert_eq!(existing.len(), 1);
    assert_eq!(existing[0].id, doctor.id);
    assert_eq!(registry.peer_count("consult-1").await, 2);
}

#[tokio::test]
async fn broadcast_reaches_other_subscribers() {
    let registry = RoomRegistry::new();

    let doctor = peer("doctor@example.com", PeerRole::Doctor);
    let patient = peer("patient@example.com", PeerRole::Patient);
    let doctor_id = doctor.id;

    let (_doctor_rx, _) = registry.join("consult-1", doctor).await;
    let (mut patient_rx, _) = registry.join("consult-1", patient).await;

    let frame = RelayFrame {
        from: doctor_id,
        message: SignalMessage::Offer {
            sdp: "v=0".to_string(),
        },
    };
    registry.broadcast("consult-1", &frame).await.unwrap();

    let received = patient_rx.recv().await.unwrap();
    let parsed: RelayFrame = serde_json::from_str(&received).unwrap();
    assert_eq!(parsed, frame);
}

#[tokio::test]
async fn broadcast_to_unknown_room_errors() {
    let registry = RoomRegistry::new();

    let frame = RelayFrame {
        from: Uuid::new_v4(),
        message: SignalMessage::LeaveRoom,
    };

    let err = registry.broadcast("nowhere", &frame).await.unwrap_err();
    assert_matches!(err, SignalingError::RoomEmpty(room) if room == "nowhere");
}

#[tokio::test]
async fn room_is_dropped_when_last_peer_leaves() {
    let registry = RoomRegistry::new();

    let doctor = peer("doctor@example.com", PeerRole::Doctor);
    let patient = peer("patient@example.com", PeerRole::Patient);
    let doctor_id = doctor.id;
    let patient_id = patient.id;

    let (_rx1, _) = registry.join("consult-1", doctor).await;
    let (_rx2, _) = registry.join("consult-1", patient).await;

    assert!(!registry.leave("consult-1", doctor_id).await);
    assert_eq!(registry.peer_count("consult-1").await, 1);

    assert!(registry.leave("consult-1", patient_id).await);
    assert_eq!(registry.peer_count("consult-1").await, 0);
    assert!(registry.snapshots().await.is_empty());
}

#[tokio::test]
async fn rooms_are_isolated() {
    let registry = RoomRegistry::new();

    let doctor = peer("doctor@example.com", PeerRole::Doctor);
    let other = peer("other@example.com", PeerRole::Patient);
    let doctor_id = doctor.id;

    let (_rx1, _) = registry.join("consult-1", doctor).await;
    let (mut other_rx, _) = registry.join("consult-2", other).await;

    let frame = RelayFrame {
        from: doctor_id,
        message: SignalMessage::ChatMessage {
            sender: "doctor@example.com".to_string(),
            text: "hello".to_string(),
            sent_at: Utc::now(),
        },
    };
    registry.broadcast("consult-1", &frame).await.unwrap();

    // Nothing should arrive in the other room.
    assert!(other_rx.try_recv().is_err());
}

#[test]
fn signal_messages_use_type_payload_framing() {
    let offer = SignalMessage::Offer {
        sdp: "v=0".to_string(),
    };
    let value = serde_json::to_value(&offer).unwrap();
    assert_eq!(value["type"], "offer");
    assert_eq!(value["payload"]["sdp"], "v=0");

    let candidate = SignalMessage::IceCandidate {
        candidate: "candidate:0 1 UDP".to_string(),
        sdp_mid: Some("0".to_string()),
        sdp_m_line_index: Some(0),
    };
    let value = serde_json::to_value(&candidate).unwrap();
    assert_eq!(value["type"], "ice-candidate");
    assert_eq!(value["payload"]["sdpMid"], "0");
    assert_eq!(value["payload"]["sdpMLineIndex"], 0);

    let leave = serde_json::to_value(&SignalMessage::LeaveRoom).unwrap();
    assert_eq!(leave["type"], "leave-room");
}

#[test]
fn relay_frames_flatten_the_envelope() {
    let from = Uuid::new_v4();
    let frame = RelayFrame {
        from,
        message: SignalMessage::ChatMessage {
            sender: "doctor@example.com".to_string(),
            text: "How are you feeling today?".to_string(),
            sent_at: Utc::now(),
        },
    };

    let value = serde_json::to_value(&frame).unwrap();
    assert_eq!(value["from"], serde_json::json!(from));
    assert_eq!(value["type"], "chat-message");
    assert_eq!(value["payload"]["text"], "How are you feeling today?");

    let parsed: RelayFrame = serde_json::from_value(value).unwrap();
    assert_eq!(parsed, frame);
}
