//! Reverse-engineered wire schema for the simulator's protobuf messages.
//!
//! Message shapes and field tags were recovered from observed traffic; they
//! are modelled as `prost` derive structs so the schema lives in-tree with
//! the tags visible next to the fields. Unknown fields are skipped by
//! `prost` during decode, which is what keeps newer client versions from
//! breaking the tap.
//!
//! Field numbers are part of the wire contract. Add fields freely; never
//! renumber.

pub mod companion;
pub mod game;

pub use companion::{
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
};
pub use game::{
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
};
