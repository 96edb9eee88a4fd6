//! Companion-app messages (TCP port 21587).

/// Envelope sent by the mobile companion app to the desktop.
///
/// Datagrams of ten bytes or fewer on this lane are keep-alives and never
/// reach the parser. An envelope without a detail and with `tag10 == 0`
/// carries only the wall clock.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RiderMessage {
    #[prost(uint32, optional, tag = "1")]
    pub rider_id: Option<u32>,
    #[prost(message, optional, tag = "2")]
    pub detail: Option<RiderDetail>,
    #[prost(uint32, optional, tag = "10")]
    pub tag10: Option<u32>,
    #[prost(message, optional, tag = "11")]
    pub clock: Option<ClockTime>,
}

/// Wall-clock payload inside a [`RiderMessage`].
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ClockTime {
    /// Milliseconds since the Unix epoch.
    #[prost(uint64, tag = "1")]
    pub time: u64,
}

/// Typed detail inside an app-to-desktop envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RiderDetail {
    #[prost(uint32, tag = "1")]
    pub detail_type: u32,
    /// Command code, present when `detail_type` is a command-sent record.
    #[prost(uint32, optional, tag = "2")]
    pub command_type: Option<u32>,
    #[prost(message, optional, tag = "3")]
    pub data: Option<DetailData>,
}

/// Inner data block of a detail record.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DetailData {
    #[prost(uint32, tag = "1")]
    pub tag1: u32,
    #[prost(message, optional, tag = "2")]
    pub device: Option<DeviceInfo>,
    #[prost(string, optional, tag = "3")]
    pub activity_name: Option<String>,
}

/// Companion device description.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceInfo {
    #[prost(string, tag = "1")]
    pub app_version: String,
    #[prost(string, tag = "2")]
    pub device_model: String,
    #[prost(string, tag = "3")]
    pub os_version: String,
}

/// Envelope sent by the desktop to the companion app.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DesktopMessage {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<DesktopItem>,
}

/// One typed item inside a desktop-to-app envelope.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DesktopItem {
    #[prost(uint32, tag = "1")]
    pub item_type: u32,
    #[prost(message, optional, tag = "2")]
    pub power_up: Option<PowerUp>,
    #[prost(message, optional, tag = "3")]
    pub command: Option<CommandInfo>,
    #[prost(message, optional, tag = "4")]
    pub details: Option<ActivityDetails>,
}

/// A power-up granted to the rider.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PowerUp {
    #[prost(string, tag = "1")]
    pub kind: String,
}

/// A command button offered to the companion app.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CommandInfo {
    #[prost(uint32, tag = "1")]
    pub code: u32,
    #[prost(string, tag = "2")]
    pub title: String,
}

/// Activity-scoped detail block.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ActivityDetails {
    #[prost(uint32, tag = "1")]
    pub details_type: u32,
    #[prost(uint64, optional, tag = "2")]
    pub activity_id: Option<u64>,
    #[prost(message, optional, tag = "3")]
    pub rider_data: Option<RiderData>,
}

/// Grouped rider records inside an activity detail.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RiderData {
    #[prost(message, repeated, tag = "1")]
    pub groups: Vec<RiderGroup>,
}

/// One indexed group of riders.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RiderGroup {
    #[prost(uint32, tag = "1")]
    pub index: u32,
    #[prost(message, repeated, tag = "2")]
    pub riders: Vec<RiderInfo>,
}

/// Geographic fix for one rider.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RiderInfo {
    #[prost(float, tag = "1")]
    pub lat: f32,
    #[prost(float, tag = "2")]
    pub lon: f32,
    #[prost(float, tag = "3")]
    pub altitude: f32,
    #[prost(string, optional, tag = "4")]
    pub description: Option<String>,
}
