//! Command line interface for the `ridetap` binary.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments for the `ridetap` binary.
#[derive(Debug, Parser)]
#[command(
    name = "ridetap",
    version,
    about = "Passive network tap for an online cycling simulator"
)]
pub struct Cli {
    /// Interface to capture on: a device name, an IPv4 address assigned to
    /// an interface, or a display name (case-insensitive). Defaults to the
    /// first interface with an assigned address.
    #[arg(short, long, default_value = "")]
    pub interface: String,

    /// Replay a previously captured pcap/pcapng file instead of live
    /// capture.
    #[arg(short, long, value_name = "PCAP")]
    pub file: Option<PathBuf>,

    /// Widen the port filter to include the companion-app stream.
    #[arg(long)]
    pub companion: bool,

    /// Directory for raw dumps of unrecognised messages.
    #[arg(long, value_name = "DIR")]
    pub dump_dir: Option<PathBuf>,

    /// Samples kept per message kind and direction in the dump directory.
    #[arg(long, default_value_t = 10, value_name = "N")]
    pub max_dumps: usize,
}
