/*!
    MPEG-TS extraction.

    Transport packets arrive as 192-byte source packets split into data
    blocks; the fraction number says how many data blocks make up one
    source packet. Output starts at the first packet whose data block
    counter falls on a source packet boundary, so that no partial
    transport packet is ever emitted.
*/

use firewire_types::{SOURCE_PACKET_HEADER_LEN, SOURCE_PACKET_LEN, StreamFormat, TS_PACKET_LEN};

use crate::{DemuxCounters, DemuxError, FrameDemuxer, OutputFrame, RawPacket};

/// The only fraction number accepted (eight data blocks per source packet).
pub const SUPPORTED_FRACTION_NUMBER: u8 = 3;

/**
    Demultiplexer for MPEG-TS streams.
*/
#[derive(Debug, Default)]
pub struct MpegTsDemuxer {
    aligned: bool,
    units: u64,
}

impl MpegTsDemuxer {
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Whether an aligned data block counter has been seen yet.
    */
    pub fn is_aligned(&self) -> bool {
        self.aligned
    }

    fn check<'a>(&self, raw: &'a [u8]) -> Result<RawPacket<'a>, DemuxError> {
        let packet = RawPacket::parse(raw)?;
        if packet.cip.format() != Some(StreamFormat::MpegTs) {
            return Err(DemuxError::WrongFormat {
                expected: StreamFormat::MpegTs,
                found: packet.cip.format_id(),
            });
        }
        let fraction_number = packet.cip.fraction_number();
        if fraction_number != SUPPORTED_FRACTION_NUMBER {
            return Err(DemuxError::UnsupportedFractionNumber(fraction_number));
        }
        Ok(packet)
    }
}

impl FrameDemuxer for MpegTsDemuxer {
    fn demux(&mut self, raw: &[u8], out: &mut OutputFrame) -> Result<usize, DemuxError> {
        let mut cursor = 0;
        while cursor < raw.len() {
            let packet = match self.check(&raw[cursor..]) {
                Ok(packet) => packet,
                Err(e) if cursor == 0 => return Err(e),
                Err(_) => break,
            };

            if packet.has_payload() {
                if !self.aligned {
                    let fraction = 1u16 << packet.cip.fraction_number();
                    if u16::from(packet.cip.dbc()) % fraction == 0 {
                        tracing::debug!(dbc = packet.cip.dbc(), "transport stream aligned");
                        self.aligned = true;
                    }
                }

                if self.aligned {
                    let units = packet.payload.chunks_exact(SOURCE_PACKET_LEN);
                    let needed = units.len() * TS_PACKET_LEN;
                    if needed > out.remaining() {
                        if cursor == 0 && out.is_empty() {
                            return Err(DemuxError::DestinationTooSmall {
                                needed,
                                capacity: out.capacity(),
                            });
                        }
                        break;
                    }
                    for unit in units {
                        out.append(&unit[SOURCE_PACKET_HEADER_LEN..])?;
                        self.units += 1;
                    }
                }
            }
            cursor += packet.wire_len();
        }

        if !out.is_empty() {
            out.mark_complete();
        }
        Ok(cursor)
    }

    fn format(&self) -> StreamFormat {
        StreamFormat::MpegTs
    }

    fn counters(&self) -> DemuxCounters {
        DemuxCounters {
            frames: 0,
            padded_strides: 0,
            transport_packets: self.units,
        }
    }
}
