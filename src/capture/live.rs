//! Live interface capture via the pnet datalink channel.

use std::{
    io,
    net::{IpAddr, Ipv4Addr},
    time::{Duration, Instant},
};

use log::info;
use pnet::datalink::{self, Channel, DataLinkReceiver, NetworkInterface};

use super::{FramePoll, FrameSource, LinkLayer, RawFrame, SourceError};
use crate::error::TapError;

/// Receive timeout; bounds how long a cancellation can go unobserved.
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Frame source reading from a local interface in promiscuous mode.
pub struct LiveSource {
    rx: Box<dyn DataLinkReceiver>,
    started_at: Instant,
}

impl LiveSource {
    /// Open a capture channel on the selected interface.
    ///
    /// `selector` accepts a device name, an IPv4 dotted-quad assigned to an
    /// interface, or the interface's friendly display name compared
    /// case-insensitively. An empty selector picks the first interface with
    /// at least one assigned address.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::InterfaceNotFound`] or
    /// [`TapError::NoUsableInterface`] when selection fails, and
    /// [`TapError::CaptureOpen`] when the channel cannot be opened
    /// (typically insufficient privilege).
    pub fn open(selector: &str) -> Result<Self, TapError> {
        let interface = select_interface(selector)?;
        info!("capturing on interface {}", interface.name);

        let config = datalink::Config {
            read_timeout: Some(READ_TIMEOUT),
            promiscuous: true,
            ..datalink::Config::default()
        };
        match datalink::channel(&interface, config) {
            Ok(Channel::Ethernet(_tx, rx)) => Ok(Self {
                rx,
                started_at: Instant::now(),
            }),
            Ok(_) => Err(TapError::CaptureOpen {
                interface: interface.name,
                source: io::Error::new(io::ErrorKind::Unsupported, "non-Ethernet channel"),
            }),
            Err(source) => Err(TapError::CaptureOpen {
                interface: interface.name,
                source,
            }),
        }
    }
}

fn select_interface(selector: &str) -> Result<NetworkInterface, TapError> {
    let interfaces = datalink::interfaces();

    if selector.is_empty() {
        return interfaces
            .into_iter()
            .find(|iface| !iface.ips.is_empty())
            .ok_or(TapError::NoUsableInterface);
    }

    let wanted_ip = selector.parse::<Ipv4Addr>().ok().map(IpAddr::V4);
    interfaces
        .into_iter()
        .find(|iface| {
            iface.name == selector
                || iface.description.eq_ignore_ascii_case(selector)
                || wanted_ip.is_some_and(|ip| iface.ips.iter().any(|net| net.ip() == ip))
        })
        .ok_or_else(|| TapError::InterfaceNotFound {
            selector: selector.to_owned(),
        })
}

impl FrameSource for LiveSource {
    fn next_frame(&mut self) -> Result<FramePoll, SourceError> {
        match self.rx.next() {
            Ok(data) => Ok(FramePoll::Frame(RawFrame {
                link: LinkLayer::Ethernet,
                data: data.to_vec(),
                captured_at: self.started_at.elapsed(),
            })),
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(FramePoll::Idle)
            }
            Err(e) => Err(SourceError::Io(e)),
        }
    }
}
