//! Typed event surface and the subscriber router.
//!
//! Every decoded message is published on its own channel. Delivery is
//! synchronous on the decoder thread, in capture order; a panicking
//! subscriber is caught, logged, and never stalls the pipeline or the other
//! subscribers. Subscribers needing asynchrony must queue internally.
//!
//! Subscriptions are registered before the session runs (registration takes
//! `&mut self`), so delivery needs no locking.

use std::panic::{catch_unwind, AssertUnwindSafe};

use log::error;

use crate::{
    commands::CompanionCommand,
    demux::Direction,
    panic::format_panic,
    proto::{
        ChatMessage,
        DeviceInfo,
        EventPositions,
        Meetup,
        PlayerEnteredWorld,
        PlayerState,
        RideOn,
        TimeSync,
    },
};

/// A rider state snapshot, incoming (another rider) or outgoing (the local
/// rider), distinguished by the channel it is published on.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerStateEvent {
    pub direction: Direction,
    /// Lane sequence number for TCP-sourced events; `None` for UDP.
    pub sequence: Option<u32>,
    pub state: PlayerState,
}

/// World-clock synchronisation record.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSyncEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub time_sync: TimeSync,
}

/// A ride-on thumb given to a rider.
#[derive(Clone, Debug, PartialEq)]
pub struct RideOnEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub ride_on: RideOn,
}

/// An in-game chat message.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub chat: ChatMessage,
}

/// A meetup being created, updated, or joined.
#[derive(Clone, Debug, PartialEq)]
pub struct MeetupEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub meetup: Meetup,
}

/// A rider entering the world.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerEnteredWorldEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub player: PlayerEnteredWorld,
}

/// Event position block for organised events.
#[derive(Clone, Debug, PartialEq)]
pub struct EventPositionsEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub positions: EventPositions,
}

/// Companion keep-alive (any app-to-desktop payload of ten bytes or fewer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeartBeatEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
}

/// Companion wall-clock synchronisation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClockSyncEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    /// Milliseconds since the Unix epoch.
    pub time: u64,
}

/// A command the companion app sent to the desktop.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSentEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub command: CompanionCommand,
    /// Raw wire code, preserved even when `command` is `Unknown`.
    pub code: u32,
}

/// A command button the desktop offered to the companion app.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandAvailableEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub command: CompanionCommand,
    pub code: u32,
    pub title: String,
}

/// A power-up granted to the rider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PowerUpEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub kind: String,
}

/// Phase transition of the rider's recorded activity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActivityPhase {
    Started { activity_id: u64 },
    Ended { name: String },
}

/// Activity lifecycle details relayed over the companion link.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivityEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub phase: ActivityPhase,
}

/// The local rider's geographic position.
#[derive(Clone, Debug, PartialEq)]
pub struct RiderPositionEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub lat: f32,
    pub lon: f32,
    pub altitude: f32,
}

/// Companion device description.
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceInfoEvent {
    pub direction: Direction,
    pub sequence: Option<u32>,
    pub device: DeviceInfo,
}

type Callback<T> = Box<dyn FnMut(&T) + Send>;

/// One event kind's subscriber list with panic-isolated delivery.
struct Channel<T> {
    name: &'static str,
    subscribers: Vec<Callback<T>>,
}

impl<T> Channel<T> {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            subscribers: Vec::new(),
        }
    }

    fn subscribe(&mut self, callback: impl FnMut(&T) + Send + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    fn publish(&mut self, event: &T) {
        for subscriber in &mut self.subscribers {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| subscriber(event))) {
                error!(
                    "{} subscriber panicked: {}",
                    self.name,
                    format_panic(panic)
                );
            }
        }
    }
}

/// Publish–subscribe surface for decoded events.
///
/// One channel per event kind; delivery preserves capture order within and
/// across channels because the whole pipeline is single-threaded.
pub struct EventBus {
    published: u64,
    incoming_player_state: Channel<PlayerStateEvent>,
    outgoing_player_state: Channel<PlayerStateEvent>,
    player_time_sync: Channel<TimeSyncEvent>,
    ride_on_given: Channel<RideOnEvent>,
    chat_message: Channel<ChatEvent>,
    meetup_update: Channel<MeetupEvent>,
    player_entered_world: Channel<PlayerEnteredWorldEvent>,
    event_positions: Channel<EventPositionsEvent>,
    heart_beat: Channel<HeartBeatEvent>,
    clock_sync: Channel<ClockSyncEvent>,
    command_sent: Channel<CommandSentEvent>,
    command_available: Channel<CommandAvailableEvent>,
    power_up_granted: Channel<PowerUpEvent>,
    activity_details: Channel<ActivityEvent>,
    rider_position: Channel<RiderPositionEvent>,
    device_info: Channel<DeviceInfoEvent>,
}

impl Default for EventBus {
    fn default() -> Self { Self::new() }
}

macro_rules! subscription {
    ($(#[$doc:meta])* $subscribe:ident, $publish:ident, $field:ident, $event:ty) => {
        $(#[$doc])*
        pub fn $subscribe(&mut self, callback: impl FnMut(&$event) + Send + 'static) -> &mut Self {
            self.$field.subscribe(callback);
            self
        }

        pub(crate) fn $publish(&mut self, event: &$event) {
            self.published += 1;
            crate::metrics::inc_events_published();
            self.$field.publish(event);
        }
    };
}

impl EventBus {
    /// Create a bus with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            published: 0,
            incoming_player_state: Channel::new("incoming-player-state"),
            outgoing_player_state: Channel::new("outgoing-player-state"),
            player_time_sync: Channel::new("player-time-sync"),
            ride_on_given: Channel::new("ride-on-given"),
            chat_message: Channel::new("chat-message"),
            meetup_update: Channel::new("meetup-update"),
            player_entered_world: Channel::new("player-entered-world"),
            event_positions: Channel::new("event-positions"),
            heart_beat: Channel::new("heart-beat"),
            clock_sync: Channel::new("clock-sync"),
            command_sent: Channel::new("command-sent"),
            command_available: Channel::new("command-available"),
            power_up_granted: Channel::new("power-up-granted"),
            activity_details: Channel::new("activity-details"),
            rider_position: Channel::new("rider-position"),
            device_info: Channel::new("device-info"),
        }
    }

    /// Number of events published so far.
    #[must_use]
    pub const fn published(&self) -> u64 { self.published }

    subscription! {
        /// Subscribe to state snapshots of other riders.
        on_incoming_player_state, publish_incoming_player_state,
        incoming_player_state, PlayerStateEvent
    }
    subscription! {
        /// Subscribe to state snapshots of the local rider.
        on_outgoing_player_state, publish_outgoing_player_state,
        outgoing_player_state, PlayerStateEvent
    }
    subscription! {
        /// Subscribe to world-clock synchronisation records.
        on_player_time_sync, publish_player_time_sync,
        player_time_sync, TimeSyncEvent
    }
    subscription! {
        /// Subscribe to ride-on notifications.
        on_ride_on_given, publish_ride_on_given, ride_on_given, RideOnEvent
    }
    subscription! {
        /// Subscribe to chat messages.
        on_chat_message, publish_chat_message, chat_message, ChatEvent
    }
    subscription! {
        /// Subscribe to meetup create/update/join records.
        on_meetup_update, publish_meetup_update, meetup_update, MeetupEvent
    }
    subscription! {
        /// Subscribe to riders entering the world.
        on_player_entered_world, publish_player_entered_world,
        player_entered_world, PlayerEnteredWorldEvent
    }
    subscription! {
        /// Subscribe to organised-event position blocks.
        on_event_positions, publish_event_positions,
        event_positions, EventPositionsEvent
    }
    subscription! {
        /// Subscribe to companion keep-alives.
        on_heart_beat, publish_heart_beat, heart_beat, HeartBeatEvent
    }
    subscription! {
        /// Subscribe to companion wall-clock synchronisation.
        on_clock_sync, publish_clock_sync, clock_sync, ClockSyncEvent
    }
    subscription! {
        /// Subscribe to commands sent from the companion app.
        on_command_sent, publish_command_sent, command_sent, CommandSentEvent
    }
    subscription! {
        /// Subscribe to command buttons offered to the companion app.
        on_command_available, publish_command_available,
        command_available, CommandAvailableEvent
    }
    subscription! {
        /// Subscribe to power-up grants.
        on_power_up_granted, publish_power_up_granted,
        power_up_granted, PowerUpEvent
    }
    subscription! {
        /// Subscribe to activity lifecycle details.
        on_activity_details, publish_activity_details,
        activity_details, ActivityEvent
    }
    subscription! {
        /// Subscribe to the local rider's geographic position.
        on_rider_position, publish_rider_position,
        rider_position, RiderPositionEvent
    }
    subscription! {
        /// Subscribe to companion device descriptions.
        on_device_info, publish_device_info, device_info, DeviceInfoEvent
    }
}
