//! Game-protocol messages (UDP port 3022, TCP port 3023).

/// Envelope sent by the desktop client to the game server.
///
/// Carries at most one [`PlayerState`] describing the local rider.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClientToServer {
    #[prost(uint32, optional, tag = "1")]
    pub connected: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub rider_id: Option<u32>,
    #[prost(int64, optional, tag = "3")]
    pub world_time: Option<i64>,
    #[prost(message, optional, tag = "7")]
    pub state: Option<PlayerState>,
}

/// Envelope sent by the game server to the desktop client.
///
/// Bundles other riders' states, an optional event-position block, and a
/// sequence of tagged player-update records.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ServerToClient {
    #[prost(uint32, optional, tag = "1")]
    pub realm: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub rider_id: Option<u32>,
    #[prost(int64, optional, tag = "3")]
    pub world_time: Option<i64>,
    #[prost(uint32, optional, tag = "4")]
    pub seqno: Option<u32>,
    #[prost(message, repeated, tag = "8")]
    pub player_states: Vec<PlayerState>,
    #[prost(message, repeated, tag = "9")]
    pub player_updates: Vec<PlayerUpdate>,
    #[prost(message, optional, tag = "24")]
    pub event_positions: Option<EventPositions>,
}

/// A rider's broadcast state snapshot.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlayerState {
    #[prost(uint32, tag = "1")]
    pub id: u32,
    #[prost(int64, tag = "2")]
    pub world_time: i64,
    #[prost(int32, tag = "3")]
    pub distance: i32,
    #[prost(int32, tag = "4")]
    pub road_time: i32,
    #[prost(int32, tag = "5")]
    pub laps: i32,
    /// Speed in millimetres per hour.
    #[prost(int32, tag = "6")]
    pub speed: i32,
    #[prost(int32, tag = "8")]
    pub road_position: i32,
    /// Cadence in micro-revolutions per second.
    #[prost(int32, tag = "9")]
    pub cadence_uhz: i32,
    #[prost(int32, tag = "11")]
    pub heartrate: i32,
    #[prost(int32, tag = "12")]
    pub power: i32,
    #[prost(int64, tag = "13")]
    pub heading: i64,
    #[prost(int32, tag = "14")]
    pub lean: i32,
    #[prost(int32, tag = "15")]
    pub climbing: i32,
    #[prost(int32, tag = "16")]
    pub time: i32,
    #[prost(int32, tag = "21")]
    pub progress: i32,
    #[prost(int64, tag = "22")]
    pub customisation_id: i64,
    #[prost(int32, tag = "23")]
    pub just_watching: i32,
    #[prost(int32, tag = "24")]
    pub calories: i32,
    #[prost(float, tag = "25")]
    pub x: f32,
    #[prost(float, tag = "26")]
    pub altitude: f32,
    #[prost(float, tag = "27")]
    pub y: f32,
    #[prost(uint32, tag = "28")]
    pub watching_rider_id: u32,
    #[prost(uint32, tag = "29")]
    pub group_id: u32,
    #[prost(int64, tag = "31")]
    pub sport: i64,
}

/// Tagged update record inside a [`ServerToClient`] envelope.
///
/// The payload bytes are re-parsed into a concrete message chosen by
/// `update_type`; unknown tags are tolerated and recorded for diagnostics.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlayerUpdate {
    #[prost(uint32, tag = "1")]
    pub update_type: u32,
    #[prost(int64, optional, tag = "2")]
    pub world_time: Option<i64>,
    #[prost(bytes = "vec", tag = "3")]
    pub payload: Vec<u8>,
}

/// World-clock synchronisation record (update type 3).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TimeSync {
    #[prost(uint32, tag = "1")]
    pub rider_id: u32,
    #[prost(int64, tag = "2")]
    pub world_time: i64,
}

/// A ride-on thumb given to a rider (update type 4).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RideOn {
    #[prost(uint32, tag = "1")]
    pub rider_id: u32,
    #[prost(uint32, tag = "2")]
    pub to_rider_id: u32,
    #[prost(string, tag = "3")]
    pub first_name: String,
    #[prost(string, tag = "4")]
    pub last_name: String,
    #[prost(uint32, tag = "5")]
    pub country_code: u32,
}

/// In-game chat message (update type 5).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChatMessage {
    #[prost(uint32, tag = "1")]
    pub rider_id: u32,
    #[prost(uint32, tag = "2")]
    pub to_rider_id: u32,
    #[prost(string, tag = "3")]
    pub first_name: String,
    #[prost(string, tag = "4")]
    pub last_name: String,
    #[prost(string, tag = "5")]
    pub message: String,
    #[prost(string, tag = "6")]
    pub avatar: String,
    #[prost(uint32, tag = "7")]
    pub country_code: u32,
}

/// Meetup create/update/join record (update types 6 and 10).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Meetup {
    #[prost(uint64, tag = "1")]
    pub meetup_id: u64,
    #[prost(uint32, tag = "2")]
    pub organizer_id: u32,
    #[prost(int64, tag = "3")]
    pub world_time: i64,
    #[prost(uint32, tag = "4")]
    pub join_location: u32,
    #[prost(uint32, tag = "5")]
    pub duration_sec: u32,
}

/// A rider entering the world (update type 105).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PlayerEnteredWorld {
    #[prost(uint32, tag = "1")]
    pub rider_id: u32,
    #[prost(int64, tag = "2")]
    pub world_time: i64,
    #[prost(string, tag = "3")]
    pub first_name: String,
    #[prost(string, tag = "4")]
    pub last_name: String,
}

/// Position block for organised events.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EventPositions {
    #[prost(uint32, tag = "1")]
    pub my_position: u32,
    #[prost(uint32, tag = "2")]
    pub total_riders: u32,
}
