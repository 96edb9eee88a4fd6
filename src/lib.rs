//! Passive, read-only network tap for an online cycling simulator.
//!
//! `ridetap` attaches to a local interface (or replays a capture file),
//! follows the simulator's well-known ports, and turns raw link-layer
//! frames into a typed stream of domain events: player state updates,
//! chat, ride-ons, meetups, and companion-app commands. It never
//! transmits, injects, or modifies traffic.
//!
//! The pipeline runs single-threaded per session: frame source →
//! demultiplexer → {TCP lane reassembly | UDP envelope strip} → protocol
//! decoders → event router. Subscribe on the session's [`EventBus`] before
//! running it:
//!
//! ```no_run
//! use std::path::Path;
//!
//! use ridetap::{CaptureSession, ReplaySource};
//! use tokio_util::sync::CancellationToken;
//!
//! let mut session = CaptureSession::new(false);
//! session.events().on_chat_message(|event| {
//!     println!("{}: {}", event.chat.first_name, event.chat.message);
//! });
//!
//! let mut source = ReplaySource::open(Path::new("ride.pcap"))?;
//! let stats = session.run(&mut source, &CancellationToken::new())?;
//! println!("{} events", stats.events_published);
//! # Ok::<(), ridetap::TapError>(())
//! ```

pub mod capture;
pub mod commands;
pub mod decode;
pub mod demux;
pub mod diagnostics;
pub mod envelope;
pub mod error;
pub mod events;
pub mod metrics;
pub mod panic;
pub mod ports;
pub mod proto;
pub mod reassembly;
pub mod session;

pub use capture::{live::LiveSource, replay::ReplaySource, FramePoll, FrameSource, RawFrame};
pub use commands::CompanionCommand;
pub use demux::{Direction, Lane};
pub use diagnostics::{DiagnosticSink, FileDumpSink, NullSink};
pub use error::{Result, TapError};
pub use events::EventBus;
pub use reassembly::{LanePayload, LaneReassembler};
pub use session::{CaptureSession, SessionState, SessionStats};
