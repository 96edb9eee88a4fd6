//! Unit tests for game-protocol decoding.

use std::sync::{Arc, Mutex};

use prost::Message;

use crate::{
    decode::{game, DecodeCx},
    demux::Direction,
    diagnostics::DiagnosticSink,
    events::EventBus,
    proto::{
        ChatMessage,
        ClientToServer,
        EventPositions,
        Meetup,
        PlayerEnteredWorld,
        PlayerState,
        PlayerUpdate,
        RideOn,
        ServerToClient,
        TimeSync,
    },
};

/// Sink remembering the kinds it was handed.
#[derive(Default)]
struct RecordingSink {
    kinds: Vec<String>,
}

impl DiagnosticSink for RecordingSink {
    fn store(&mut self, kind: &str, _raw: &[u8], _direction: Direction, _sequence: Option<u32>) {
        self.kinds.push(kind.to_owned());
    }
}

fn player_state(id: u32) -> PlayerState {
    PlayerState {
        id,
        world_time: 1_000_000,
        power: 250,
        heartrate: 150,
        speed: 11_000_000,
        ..PlayerState::default()
    }
}

fn update(update_type: u32, payload: Vec<u8>) -> PlayerUpdate {
    PlayerUpdate {
        update_type,
        world_time: Some(1_000_010),
        payload,
    }
}

#[test]
fn outbound_with_state_emits_outgoing_player_event() {
    let mut bus = EventBus::new();
    let states = Arc::new(Mutex::new(Vec::new()));
    {
        let states = Arc::clone(&states);
        bus.on_outgoing_player_state(move |event| {
            states.lock().expect("lock").push(event.clone());
        });
    }
    let mut sink = RecordingSink::default();

    let envelope = ClientToServer {
        rider_id: Some(77),
        state: Some(player_state(77)),
        ..ClientToServer::default()
    };
    game::decode_outbound(
        &envelope.encode_to_vec(),
        None,
        &mut DecodeCx {
            bus: &mut bus,
            sink: &mut sink,
        },
    )
    .expect("decode outbound");

    let states = states.lock().expect("lock");
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].direction, Direction::Outbound);
    assert_eq!(states[0].sequence, None);
    assert_eq!(states[0].state.id, 77);
}

#[test]
fn outbound_without_state_emits_nothing() {
    let mut bus = EventBus::new();
    let mut sink = RecordingSink::default();

    let envelope = ClientToServer {
        rider_id: Some(77),
        ..ClientToServer::default()
    };
    game::decode_outbound(
        &envelope.encode_to_vec(),
        None,
        &mut DecodeCx {
            bus: &mut bus,
            sink: &mut sink,
        },
    )
    .expect("decode outbound");
    assert_eq!(bus.published(), 0);
}

#[test]
fn inbound_emits_player_states_and_event_positions() {
    let mut bus = EventBus::new();
    let ids = Arc::new(Mutex::new(Vec::new()));
    let positions = Arc::new(Mutex::new(Vec::new()));
    {
        let ids = Arc::clone(&ids);
        bus.on_incoming_player_state(move |event| {
            ids.lock().expect("lock").push(event.state.id);
        });
    }
    {
        let positions = Arc::clone(&positions);
        bus.on_event_positions(move |event| {
            positions.lock().expect("lock").push(event.positions.clone());
        });
    }
    let mut sink = RecordingSink::default();

    let envelope = ServerToClient {
        player_states: vec![player_state(1), player_state(2)],
        event_positions: Some(EventPositions {
            my_position: 4,
            total_riders: 120,
        }),
        ..ServerToClient::default()
    };
    game::decode_inbound(
        &envelope.encode_to_vec(),
        Some(31),
        &mut DecodeCx {
            bus: &mut bus,
            sink: &mut sink,
        },
    )
    .expect("decode inbound");

    assert_eq!(*ids.lock().expect("lock"), vec![1, 2]);
    assert_eq!(
        *positions.lock().expect("lock"),
        vec![EventPositions {
            my_position: 4,
            total_riders: 120,
        }]
    );
}

#[test]
fn chat_update_record_emits_chat_event() {
    let mut bus = EventBus::new();
    let chats = Arc::new(Mutex::new(Vec::new()));
    {
        let chats = Arc::clone(&chats);
        bus.on_chat_message(move |event| chats.lock().expect("lock").push(event.clone()));
    }
    let mut sink = RecordingSink::default();

    let chat = ChatMessage {
        rider_id: 5,
        first_name: "Jo".into(),
        last_name: "Rider".into(),
        message: "ride on!".into(),
        ..ChatMessage::default()
    };
    let envelope = ServerToClient {
        player_updates: vec![update(5, chat.encode_to_vec())],
        ..ServerToClient::default()
    };
    game::decode_inbound(
        &envelope.encode_to_vec(),
        Some(12),
        &mut DecodeCx {
            bus: &mut bus,
            sink: &mut sink,
        },
    )
    .expect("decode inbound");

    let chats = chats.lock().expect("lock");
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].chat.message, "ride on!");
    assert_eq!(chats[0].sequence, Some(12));
    assert_eq!(chats[0].direction, Direction::Inbound);
}

#[test]
fn recognised_update_tags_map_to_their_events() {
    let mut bus = EventBus::new();
    let labels = Arc::new(Mutex::new(Vec::new()));
    {
        let labels = Arc::clone(&labels);
        bus.on_player_time_sync(move |_| labels.lock().expect("lock").push("time-sync"));
    }
    {
        let labels = Arc::clone(&labels);
        bus.on_ride_on_given(move |_| labels.lock().expect("lock").push("ride-on"));
    }
    {
        let labels = Arc::clone(&labels);
        bus.on_meetup_update(move |_| labels.lock().expect("lock").push("meetup"));
    }
    {
        let labels = Arc::clone(&labels);
        bus.on_player_entered_world(move |_| labels.lock().expect("lock").push("entered"));
    }
    let mut sink = RecordingSink::default();

    let envelope = ServerToClient {
        player_updates: vec![
            update(3, TimeSync::default().encode_to_vec()),
            update(4, RideOn::default().encode_to_vec()),
            update(6, Meetup::default().encode_to_vec()),
            update(10, Meetup::default().encode_to_vec()),
            update(105, PlayerEnteredWorld::default().encode_to_vec()),
        ],
        ..ServerToClient::default()
    };
    game::decode_inbound(
        &envelope.encode_to_vec(),
        Some(1),
        &mut DecodeCx {
            bus: &mut bus,
            sink: &mut sink,
        },
    )
    .expect("decode inbound");

    // Sub-record order is preserved.
    assert_eq!(
        *labels.lock().expect("lock"),
        vec!["time-sync", "ride-on", "meetup", "meetup", "entered"]
    );
}

#[test]
fn opaque_and_unknown_updates_reach_the_sink_without_events() {
    let mut bus = EventBus::new();
    let mut sink = RecordingSink::default();

    let envelope = ServerToClient {
        player_updates: vec![update(109, vec![0x01]), update(42, vec![0x02])],
        ..ServerToClient::default()
    };
    game::decode_inbound(
        &envelope.encode_to_vec(),
        None,
        &mut DecodeCx {
            bus: &mut bus,
            sink: &mut sink,
        },
    )
    .expect("decode inbound");

    assert_eq!(bus.published(), 0);
    assert_eq!(sink.kinds, vec!["player-update-109", "player-update-42"]);
}

#[test]
fn broken_sub_record_is_skipped_but_later_records_decode() {
    let mut bus = EventBus::new();
    let chats = Arc::new(Mutex::new(Vec::new()));
    {
        let chats = Arc::clone(&chats);
        bus.on_chat_message(move |event| {
            chats.lock().expect("lock").push(event.chat.message.clone());
        });
    }
    let mut sink = RecordingSink::default();

    let chat = ChatMessage {
        message: "still here".into(),
        ..ChatMessage::default()
    };
    let envelope = ServerToClient {
        // 0xFF is an invalid wire type and cannot parse as any record.
        player_updates: vec![update(5, vec![0xFF]), update(5, chat.encode_to_vec())],
        ..ServerToClient::default()
    };
    game::decode_inbound(
        &envelope.encode_to_vec(),
        None,
        &mut DecodeCx {
            bus: &mut bus,
            sink: &mut sink,
        },
    )
    .expect("decode inbound");

    assert_eq!(*chats.lock().expect("lock"), vec!["still here"]);
}

#[test]
fn malformed_envelope_is_an_error() {
    let mut bus = EventBus::new();
    let mut sink = RecordingSink::default();
    let err = game::decode_inbound(
        &[0xFF, 0xFF],
        None,
        &mut DecodeCx {
            bus: &mut bus,
            sink: &mut sink,
        },
    )
    .expect_err("invalid envelope");
    assert!(err.to_string().contains("server-to-client"));
}
