//! Unit tests for companion-protocol decoding.

use std::sync::{Arc, Mutex};

use prost::Message;

use crate::{
    commands::CompanionCommand,
    decode::{companion, DecodeCx},
    demux::Direction,
    diagnostics::DiagnosticSink,
    events::{ActivityPhase, EventBus},
    proto::{
        ActivityDetails,
        ClockTime,
        CommandInfo,
        DesktopItem,
        DesktopMessage,
        DetailData,
        DeviceInfo,
        PowerUp,
        RiderData,
        RiderDetail,
        RiderGroup,
        RiderInfo,
        RiderMessage,
    },
};

#[derive(Default)]
struct RecordingSink {
    kinds: Vec<String>,
}

impl DiagnosticSink for RecordingSink {
    fn store(&mut self, kind: &str, _raw: &[u8], _direction: Direction, _sequence: Option<u32>) {
        self.kinds.push(kind.to_owned());
    }
}

fn cx<'a>(bus: &'a mut EventBus, sink: &'a mut RecordingSink) -> DecodeCx<'a> {
    DecodeCx { bus, sink }
}

/// Envelope with enough ballast to clear the heartbeat threshold.
fn rider_message(detail: Option<RiderDetail>) -> RiderMessage {
    RiderMessage {
        rider_id: Some(4_242_424),
        detail,
        tag10: Some(1),
        clock: None,
    }
}

#[test]
fn short_payload_is_a_heart_beat() {
    let mut bus = EventBus::new();
    let beats = Arc::new(Mutex::new(0_u32));
    {
        let beats = Arc::clone(&beats);
        bus.on_heart_beat(move |_| *beats.lock().expect("lock") += 1);
    }
    let mut sink = RecordingSink::default();

    // Any payload of ten bytes or fewer, parseable or not, is a keep-alive.
    companion::decode_outbound(&[0xDE, 0xAD, 0xBE, 0xEF], Some(3), &mut cx(&mut bus, &mut sink))
        .expect("decode heartbeat");
    assert_eq!(*beats.lock().expect("lock"), 1);
}

#[test]
fn detail_less_envelope_with_zero_tag10_is_clock_sync() {
    let mut bus = EventBus::new();
    let times = Arc::new(Mutex::new(Vec::new()));
    {
        let times = Arc::clone(&times);
        bus.on_clock_sync(move |event| times.lock().expect("lock").push(event.time));
    }
    let mut sink = RecordingSink::default();

    let message = RiderMessage {
        rider_id: Some(4_242_424),
        detail: None,
        tag10: Some(0),
        clock: Some(ClockTime {
            time: 1_700_000_000_000,
        }),
    };
    companion::decode_outbound(
        &message.encode_to_vec(),
        Some(9),
        &mut cx(&mut bus, &mut sink),
    )
    .expect("decode clock sync");
    assert_eq!(*times.lock().expect("lock"), vec![1_700_000_000_000]);
}

#[test]
fn command_sent_maps_code_to_named_command() {
    let mut bus = EventBus::new();
    let commands = Arc::new(Mutex::new(Vec::new()));
    {
        let commands = Arc::clone(&commands);
        bus.on_command_sent(move |event| commands.lock().expect("lock").push(event.clone()));
    }
    let mut sink = RecordingSink::default();

    let message = rider_message(Some(RiderDetail {
        detail_type: 22,
        command_type: Some(1011),
        data: None,
    }));
    companion::decode_outbound(
        &message.encode_to_vec(),
        Some(55),
        &mut cx(&mut bus, &mut sink),
    )
    .expect("decode command");

    let commands = commands.lock().expect("lock");
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].command, CompanionCommand::GoStraight);
    assert_eq!(commands[0].code, 1011);
    assert_eq!(commands[0].direction, Direction::Outbound);
    assert_eq!(commands[0].sequence, Some(55));
}

#[test]
fn unknown_command_code_is_delivered_with_raw_value() {
    let mut bus = EventBus::new();
    let commands = Arc::new(Mutex::new(Vec::new()));
    {
        let commands = Arc::clone(&commands);
        bus.on_command_sent(move |event| commands.lock().expect("lock").push(event.clone()));
    }
    let mut sink = RecordingSink::default();

    let message = rider_message(Some(RiderDetail {
        detail_type: 22,
        command_type: Some(4040),
        data: None,
    }));
    companion::decode_outbound(&message.encode_to_vec(), None, &mut cx(&mut bus, &mut sink))
        .expect("decode command");

    let commands = commands.lock().expect("lock");
    assert_eq!(commands[0].command, CompanionCommand::Unknown(4040));
    assert_eq!(commands[0].code, 4040);
}

#[test]
fn device_detail_tag_four_emits_device_info() {
    let mut bus = EventBus::new();
    let devices = Arc::new(Mutex::new(Vec::new()));
    {
        let devices = Arc::clone(&devices);
        bus.on_device_info(move |event| devices.lock().expect("lock").push(event.device.clone()));
    }
    let mut sink = RecordingSink::default();

    let message = rider_message(Some(RiderDetail {
        detail_type: 29,
        command_type: None,
        data: Some(DetailData {
            tag1: 4,
            device: Some(DeviceInfo {
                app_version: "3.52.0".into(),
                device_model: "Pixel 8".into(),
                os_version: "14".into(),
            }),
            activity_name: None,
        }),
    }));
    companion::decode_outbound(&message.encode_to_vec(), None, &mut cx(&mut bus, &mut sink))
        .expect("decode device info");

    let devices = devices.lock().expect("lock");
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].device_model, "Pixel 8");
}

#[test]
fn device_detail_tag_fifteen_emits_activity_ended() {
    let mut bus = EventBus::new();
    let phases = Arc::new(Mutex::new(Vec::new()));
    {
        let phases = Arc::clone(&phases);
        bus.on_activity_details(move |event| phases.lock().expect("lock").push(event.phase.clone()));
    }
    let mut sink = RecordingSink::default();

    let message = rider_message(Some(RiderDetail {
        detail_type: 29,
        command_type: None,
        data: Some(DetailData {
            tag1: 15,
            device: None,
            activity_name: Some("Morning Ride".into()),
        }),
    }));
    companion::decode_outbound(&message.encode_to_vec(), None, &mut cx(&mut bus, &mut sink))
        .expect("decode activity end");

    assert_eq!(
        *phases.lock().expect("lock"),
        vec![ActivityPhase::Ended {
            name: "Morning Ride".into(),
        }]
    );
}

#[test]
fn ride_on_candidate_is_recorded_without_event() {
    let mut bus = EventBus::new();
    let mut sink = RecordingSink::default();

    let message = rider_message(Some(RiderDetail {
        detail_type: 16,
        command_type: None,
        data: None,
    }));
    companion::decode_outbound(&message.encode_to_vec(), None, &mut cx(&mut bus, &mut sink))
        .expect("decode candidate");

    assert_eq!(bus.published(), 0);
    assert_eq!(sink.kinds, vec!["ride-on-candidate"]);
}

#[test]
fn diagnostic_detail_types_only_reach_the_sink() {
    let mut bus = EventBus::new();
    let mut sink = RecordingSink::default();

    for detail_type in [14, 20, 28] {
        let message = rider_message(Some(RiderDetail {
            detail_type,
            command_type: None,
            data: None,
        }));
        companion::decode_outbound(&message.encode_to_vec(), None, &mut cx(&mut bus, &mut sink))
            .expect("decode diagnostic detail");
    }

    assert_eq!(bus.published(), 0);
    assert_eq!(
        sink.kinds,
        vec![
            "companion-detail-14",
            "companion-detail-20",
            "companion-detail-28",
        ]
    );
}

#[test]
fn inbound_power_up_and_command_available() {
    let mut bus = EventBus::new();
    let kinds = Arc::new(Mutex::new(Vec::new()));
    let buttons = Arc::new(Mutex::new(Vec::new()));
    {
        let kinds = Arc::clone(&kinds);
        bus.on_power_up_granted(move |event| kinds.lock().expect("lock").push(event.kind.clone()));
    }
    {
        let buttons = Arc::clone(&buttons);
        bus.on_command_available(move |event| {
            buttons.lock().expect("lock").push(event.clone());
        });
    }
    let mut sink = RecordingSink::default();

    let message = DesktopMessage {
        items: vec![
            DesktopItem {
                item_type: 2,
                power_up: Some(PowerUp {
                    kind: "AERO".into(),
                }),
                ..DesktopItem::default()
            },
            DesktopItem {
                item_type: 4,
                command: Some(CommandInfo {
                    code: 6,
                    title: "Ride On".into(),
                }),
                ..DesktopItem::default()
            },
            DesktopItem {
                item_type: 4,
                command: Some(CommandInfo {
                    code: 7777,
                    title: "Mystery".into(),
                }),
                ..DesktopItem::default()
            },
        ],
    };
    companion::decode_inbound(
        &message.encode_to_vec(),
        Some(2),
        &mut cx(&mut bus, &mut sink),
    )
    .expect("decode inbound");

    assert_eq!(*kinds.lock().expect("lock"), vec!["AERO"]);
    let buttons = buttons.lock().expect("lock");
    assert_eq!(buttons[0].command, CompanionCommand::RideOn);
    assert_eq!(buttons[0].title, "Ride On");
    assert_eq!(buttons[1].command, CompanionCommand::Unknown(7777));
    assert_eq!(buttons[1].code, 7777);
}

#[test]
fn activity_started_detail_emits_event() {
    let mut bus = EventBus::new();
    let phases = Arc::new(Mutex::new(Vec::new()));
    {
        let phases = Arc::clone(&phases);
        bus.on_activity_details(move |event| phases.lock().expect("lock").push(event.phase.clone()));
    }
    let mut sink = RecordingSink::default();

    let message = DesktopMessage {
        items: vec![DesktopItem {
            item_type: 13,
            details: Some(ActivityDetails {
                details_type: 3,
                activity_id: Some(987_654_321),
                rider_data: None,
            }),
            ..DesktopItem::default()
        }],
    };
    companion::decode_inbound(&message.encode_to_vec(), None, &mut cx(&mut bus, &mut sink))
        .expect("decode inbound");

    assert_eq!(
        *phases.lock().expect("lock"),
        vec![ActivityPhase::Started {
            activity_id: 987_654_321,
        }]
    );
}

#[test]
fn rider_position_needs_group_ten_with_exactly_one_rider() {
    let mut bus = EventBus::new();
    let fixes = Arc::new(Mutex::new(Vec::new()));
    {
        let fixes = Arc::clone(&fixes);
        bus.on_rider_position(move |event| {
            fixes.lock().expect("lock").push((event.lat, event.lon, event.altitude));
        });
    }
    let mut sink = RecordingSink::default();

    let rider = |lat: f32| RiderInfo {
        lat,
        lon: 4.35,
        altitude: 12.5,
        description: None,
    };
    let message = DesktopMessage {
        items: vec![DesktopItem {
            item_type: 13,
            details: Some(ActivityDetails {
                details_type: 5,
                activity_id: None,
                rider_data: Some(RiderData {
                    groups: vec![
                        RiderGroup {
                            index: 10,
                            riders: vec![rider(50.85)],
                        },
                        // Wrong index: ignored.
                        RiderGroup {
                            index: 3,
                            riders: vec![rider(0.0)],
                        },
                        // Two riders: logged, not emitted.
                        RiderGroup {
                            index: 10,
                            riders: vec![rider(1.0), rider(2.0)],
                        },
                    ],
                }),
            }),
            ..DesktopItem::default()
        }],
    };
    companion::decode_inbound(&message.encode_to_vec(), None, &mut cx(&mut bus, &mut sink))
        .expect("decode inbound");

    assert_eq!(*fixes.lock().expect("lock"), vec![(50.85, 4.35, 12.5)]);
}

#[test]
fn ignored_item_types_produce_neither_events_nor_samples() {
    let mut bus = EventBus::new();
    let mut sink = RecordingSink::default();

    let message = DesktopMessage {
        items: [1, 3, 6, 9]
            .into_iter()
            .map(|item_type| DesktopItem {
                item_type,
                ..DesktopItem::default()
            })
            .collect(),
    };
    companion::decode_inbound(&message.encode_to_vec(), None, &mut cx(&mut bus, &mut sink))
        .expect("decode inbound");

    assert_eq!(bus.published(), 0);
    assert!(sink.kinds.is_empty());
}

#[test]
fn opaque_and_unknown_details_reach_the_sink() {
    let mut bus = EventBus::new();
    let mut sink = RecordingSink::default();

    let details_item = |details_type: u32| DesktopItem {
        item_type: 13,
        details: Some(ActivityDetails {
            details_type,
            activity_id: None,
            rider_data: None,
        }),
        ..DesktopItem::default()
    };
    let message = DesktopMessage {
        items: vec![details_item(21), details_item(99)],
    };
    companion::decode_inbound(&message.encode_to_vec(), None, &mut cx(&mut bus, &mut sink))
        .expect("decode inbound");

    assert_eq!(bus.published(), 0);
    assert_eq!(sink.kinds, vec!["activity-details-21", "activity-details-99"]);
}

#[test]
fn malformed_envelope_is_an_error() {
    let mut bus = EventBus::new();
    let mut sink = RecordingSink::default();
    // Eleven bytes of invalid wire data: above the heartbeat threshold.
    let bytes = [0xFF_u8; 11];
    let err = companion::decode_outbound(&bytes, None, &mut cx(&mut bus, &mut sink))
        .expect_err("invalid envelope");
    assert!(err.to_string().contains("rider-message"));
}
