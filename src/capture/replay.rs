//! Replay of pcap and pcapng capture files.
//!
//! The reader is incremental: blocks are consumed as they parse, and
//! `Incomplete` triggers a refill rather than loading the file into memory.
//! Replay feeds the same pipeline as live capture, unchanged.

use std::{fs::File, path::Path, time::Duration};

use pcap_parser::{
    create_reader,
    data::{get_packetdata, PacketData, ETHERTYPE_IPV4, ETHERTYPE_IPV6},
    pcapng::Block,
    traits::{PcapNGPacketBlock, PcapReaderIterator},
    Linktype,
    PcapBlockOwned,
    PcapError,
};

use super::{FramePoll, FrameSource, LinkLayer, RawFrame, SourceError};
use crate::error::TapError;

const READER_BUFFER_LEN: usize = 65536;

/// Frame source replaying a previously captured file.
pub struct ReplaySource {
    reader: Box<dyn PcapReaderIterator>,
    legacy_linktype: Option<Linktype>,
    /// Link types of pcapng interfaces, indexed by interface id.
    idb_linktypes: Vec<Linktype>,
}

impl ReplaySource {
    /// Open a capture file for replay.
    ///
    /// # Errors
    ///
    /// Returns [`TapError::CaptureFileNotFound`] when `path` does not
    /// exist, or a source error when the file cannot be opened or is not a
    /// capture file.
    pub fn open(path: &Path) -> Result<Self, TapError> {
        if !path.is_file() {
            return Err(TapError::CaptureFileNotFound {
                path: path.to_owned(),
            });
        }
        let file = File::open(path).map_err(SourceError::Io)?;
        let reader = create_reader(READER_BUFFER_LEN, file)
            .map_err(|e| SourceError::Parse(format!("{e:?}")))?;
        Ok(Self {
            reader,
            legacy_linktype: None,
            idb_linktypes: Vec::new(),
        })
    }
}

impl FrameSource for ReplaySource {
    fn next_frame(&mut self) -> Result<FramePoll, SourceError> {
        loop {
            match self.reader.next() {
                Ok((offset, block)) => {
                    let frame = frame_from_block(
                        &block,
                        &mut self.legacy_linktype,
                        &mut self.idb_linktypes,
                    );
                    self.reader.consume(offset);
                    if let Some(frame) = frame {
                        return Ok(FramePoll::Frame(frame));
                    }
                }
                Err(PcapError::Eof) => return Ok(FramePoll::End),
                Err(PcapError::Incomplete(_)) => {
                    self.reader
                        .refill()
                        .map_err(|e| SourceError::Parse(format!("{e:?}")))?;
                }
                Err(e) => return Err(SourceError::Parse(format!("{e:?}"))),
            }
        }
    }
}

/// Extract one frame from a parsed block, tracking link-type headers.
fn frame_from_block(
    block: &PcapBlockOwned<'_>,
    legacy_linktype: &mut Option<Linktype>,
    idb_linktypes: &mut Vec<Linktype>,
) -> Option<RawFrame> {
    match block {
        PcapBlockOwned::LegacyHeader(hdr) => {
            *legacy_linktype = Some(hdr.network);
            None
        }
        PcapBlockOwned::Legacy(b) => {
            let linktype = legacy_linktype.unwrap_or(Linktype::ETHERNET);
            let captured_at =
                Duration::new(u64::from(b.ts_sec), b.ts_usec.saturating_mul(1000));
            raw_frame(
                get_packetdata(b.data, linktype, b.caplen as usize)?,
                captured_at,
            )
        }
        PcapBlockOwned::NG(block) => match block {
            Block::SectionHeader(_) => {
                idb_linktypes.clear();
                None
            }
            Block::InterfaceDescription(idb) => {
                idb_linktypes.push(idb.linktype);
                None
            }
            Block::EnhancedPacket(epb) => {
                let linktype = *idb_linktypes.get(epb.if_id as usize)?;
                // Microsecond resolution, the pcapng default; captures with
                // a custom if_tsresol replay with scaled sequence numbers,
                // which stay valid as opaque correlation ids.
                let micros = (u64::from(epb.ts_high) << 32) | u64::from(epb.ts_low);
                raw_frame(
                    get_packetdata(epb.packet_data(), linktype, epb.caplen as usize)?,
                    Duration::from_micros(micros),
                )
            }
            Block::SimplePacket(spb) => {
                let linktype = *idb_linktypes.first()?;
                raw_frame(
                    get_packetdata(spb.packet_data(), linktype, spb.origlen as usize)?,
                    Duration::ZERO,
                )
            }
            _ => None,
        },
    }
}

fn raw_frame(packet: PacketData<'_>, captured_at: Duration) -> Option<RawFrame> {
    match packet {
        PacketData::L2(data) => Some(RawFrame {
            link: LinkLayer::Ethernet,
            data: data.to_vec(),
            captured_at,
        }),
        PacketData::L3(ethertype, data)
            if ethertype == ETHERTYPE_IPV4 || ethertype == ETHERTYPE_IPV6 =>
        {
            Some(RawFrame {
                link: LinkLayer::Ip,
                data: data.to_vec(),
                captured_at,
            })
        }
        _ => None,
    }
}
