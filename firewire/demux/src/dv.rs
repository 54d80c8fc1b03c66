/*!
    DV frame reassembly.

    Each DV packet carries whole 480-byte data groups. The first DIF block
    of a group tells whether the group starts a frame (header section of
    DIF sequence 0). Groups are copied verbatim until the next frame start;
    if a frame ended up short because groups were lost on the bus, it is
    padded with filler groups so every frame keeps the size its video
    system requires.
*/

use firewire_types::{DATA_GROUP_LEN, DifBlock, StreamFormat, VideoSystem};

use crate::{DemuxCounters, DemuxError, FrameDemuxer, OutputFrame, RawPacket};

/// Fill byte of padding groups.
const PAD_BYTE: u8 = 0xff;

/**
    Groups of padding owed by a frame that closed after `counted` groups
    when `expected` were required: `(expected - counted) mod expected`.

    A frame closed with zero groups needs no padding.
*/
pub fn padding_strides(expected: usize, counted: usize) -> usize {
    if expected == 0 {
        return 0;
    }
    let expected = expected as i64;
    (expected - counted as i64).rem_euclid(expected) as usize
}

/**
    Demultiplexer for DV streams.

    Session state lives here: the latched video system, the number of
    frames started and groups counted in the current frame, and any
    padding or input groups that did not fit the last destination.

    After [`discard_unit`](FrameDemuxer::discard_unit) groups are skipped
    until the next frame start, so no unit ever begins mid-frame.
*/
#[derive(Debug)]
pub struct DvDemuxer {
    system: Option<VideoSystem>,
    frames: u64,
    blocks: usize,
    pending_pad: usize,
    padded: u64,
    carry: Vec<u8>,
    carry_fs: bool,
    resync: bool,
    pad: [u8; DATA_GROUP_LEN],
}

impl Default for DvDemuxer {
    fn default() -> Self {
        Self::new()
    }
}

impl DvDemuxer {
    pub fn new() -> Self {
        Self {
            system: None,
            frames: 0,
            blocks: 0,
            pending_pad: 0,
            padded: 0,
            carry: Vec::new(),
            carry_fs: false,
            resync: false,
            pad: [PAD_BYTE; DATA_GROUP_LEN],
        }
    }

    /**
        The video system, once the first frame start has been seen.
    */
    pub fn system(&self) -> Option<VideoSystem> {
        self.system
    }

    /// Frame starts seen so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Groups counted in the frame being assembled.
    pub fn blocks_in_frame(&self) -> usize {
        self.blocks
    }

    fn latch(&mut self, fs: bool) -> VideoSystem {
        if let Some(system) = self.system {
            return system;
        }
        let system = VideoSystem::from_fs(fs);
        tracing::info!(%system, "video system detected");
        self.system = Some(system);
        system
    }

    fn close_frame(&mut self, system: VideoSystem) {
        let expected = system.blocks_per_frame();
        let pad = padding_strides(expected, self.blocks);
        if pad > 0 {
            tracing::debug!(
                frame = self.frames,
                blocks = self.blocks,
                expected,
                pad,
                "padding short frame"
            );
        }
        self.pending_pad += pad;
        self.blocks = 0;
    }

    /**
        Write owed padding groups. Returns true once none is left.
    */
    fn flush_padding(&mut self, out: &mut OutputFrame) -> Result<bool, DemuxError> {
        while self.pending_pad > 0 && out.remaining() >= DATA_GROUP_LEN {
            out.append(&self.pad)?;
            self.pending_pad -= 1;
            self.padded += 1;
        }
        Ok(self.pending_pad == 0)
    }

    /**
        Process the data groups in `groups`.

        Returns the offset of the first group left unprocessed when the
        destination was completed part way through, or `None` when every
        group was handled.
    */
    fn process_groups(
        &mut self,
        groups: &[u8],
        fs: bool,
        out: &mut OutputFrame,
    ) -> Result<Option<usize>, DemuxError> {
        for (i, group) in groups.chunks_exact(DATA_GROUP_LEN).enumerate() {
            let offset = i * DATA_GROUP_LEN;
            let Some(block) = DifBlock::new(group) else {
                break;
            };

            let frame_start = block.is_frame_start();
            if frame_start && self.resync {
                tracing::debug!(frame = self.frames + 1, "resynchronized on frame start");
                self.resync = false;
            }
            if frame_start {
                let system = self.latch(fs);
                if self.frames > 0 && self.blocks > 0 {
                    self.close_frame(system);
                }
                // The previous frame goes out before this one starts
                if !self.flush_padding(out)? || (self.frames > 0 && !out.is_empty()) {
                    out.mark_complete();
                    return Ok(Some(offset));
                }
                self.frames += 1;
            }

            if self.frames == 0 || self.resync {
                continue;
            }
            if out.remaining() < DATA_GROUP_LEN {
                out.mark_complete();
                return Ok(Some(offset));
            }

            let copy = out.append(group)?;
            self.blocks += 1;

            if frame_start && self.system == Some(VideoSystem::Pal) && DifBlock::force_dsf(copy) {
                tracing::trace!(frame = self.frames, "DSF flag forced on 625/50 header");
            }
        }
        Ok(None)
    }

    /**
        Finish groups left over from the previous call.

        Returns false if the destination filled up again.
    */
    fn drain_carry(&mut self, out: &mut OutputFrame) -> Result<bool, DemuxError> {
        if self.carry.is_empty() {
            return Ok(true);
        }
        let mut carry = std::mem::take(&mut self.carry);
        let stopped = self.process_groups(&carry, self.carry_fs, out)?;
        match stopped {
            Some(offset) => {
                carry.drain(..offset);
                self.carry = carry;
                Ok(false)
            }
            None => {
                carry.clear();
                self.carry = carry;
                Ok(true)
            }
        }
    }

    fn check<'a>(&self, raw: &'a [u8]) -> Result<RawPacket<'a>, DemuxError> {
        let packet = RawPacket::parse(raw)?;
        if packet.cip.format() != Some(StreamFormat::Dv) {
            return Err(DemuxError::WrongFormat {
                expected: StreamFormat::Dv,
                found: packet.cip.format_id(),
            });
        }
        Ok(packet)
    }
}

impl FrameDemuxer for DvDemuxer {
    fn demux(&mut self, raw: &[u8], out: &mut OutputFrame) -> Result<usize, DemuxError> {
        if out.capacity() < DATA_GROUP_LEN {
            return Err(DemuxError::DestinationTooSmall {
                needed: DATA_GROUP_LEN,
                capacity: out.capacity(),
            });
        }
        if !self.drain_carry(out)? {
            return Ok(0);
        }

        let mut cursor = 0;
        while cursor < raw.len() {
            let packet = match self.check(&raw[cursor..]) {
                Ok(packet) => packet,
                Err(e) if cursor == 0 => return Err(e),
                Err(_) => break,
            };
            let next = cursor + packet.wire_len();

            if packet.has_payload() {
                let fs = packet.cip.dv_fs();
                if let Some(offset) = self.process_groups(packet.payload, fs, out)? {
                    self.carry.extend_from_slice(&packet.payload[offset..]);
                    self.carry_fs = fs;
                    return Ok(next);
                }
            }
            cursor = next;
        }
        Ok(cursor)
    }

    fn discard_unit(&mut self) {
        self.blocks = 0;
        self.pending_pad = 0;
        self.carry.clear();
        self.resync = self.frames > 0;
    }

    fn format(&self) -> StreamFormat {
        StreamFormat::Dv
    }

    fn counters(&self) -> DemuxCounters {
        DemuxCounters {
            frames: self.frames,
            padded_strides: self.padded,
            transport_packets: 0,
        }
    }
}
