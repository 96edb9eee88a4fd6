//! Well-known simulator ports and the capture filter contract.
//!
//! The simulator speaks on three fixed ports: game state over UDP, the game
//! TCP side channel, and the companion-app TCP link. These constants are an
//! external compatibility surface and must not be made configurable.

/// UDP port carrying game player-state traffic in both directions.
pub const GAME_UDP_PORT: u16 = 3022;

/// TCP port carrying the inbound game message stream.
pub const GAME_TCP_PORT: u16 = 3023;

/// TCP port linking the desktop simulator with the mobile companion app.
pub const COMPANION_TCP_PORT: u16 = 21587;

/// BPF filter expression equivalent to the demultiplexer's port rules.
///
/// The live source does not install a kernel filter; the demultiplexer
/// applies the same predicate in software. The expression is published so
/// operators capturing externally (`tcpdump -w`) record exactly the traffic
/// the replay pipeline will consume.
pub const CAPTURE_FILTER: &str = "udp port 3022 or tcp port 3023";

/// Widened filter expression covering the optional companion-app capture.
pub const CAPTURE_FILTER_WITH_COMPANION: &str =
    "udp port 3022 or tcp port 3023 or tcp port 21587";
