/*!
    Receive and output buffer geometry.
*/

use crate::{CIP_HEADER_LEN, Error, ISO_HEADER_LEN, Result, TS_PACKET_LEN, VideoSystem};

/// Highest isochronous channel number.
const MAX_CHANNEL: u8 = 63;

/// Highest tag value.
const MAX_TAG: u8 = 3;

/**
    Receive buffer programming for an isochronous channel.

    The device splits its receive buffer into `chunks`, each holding
    `packets` slots of `packet_size` bytes. One read returns at most one
    chunk.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelGeometry {
    pub chunks: u32,
    pub packets: u32,
    pub packet_size: u32,
}

impl ChannelGeometry {
    /// Small buffer used for the single exploratory read.
    pub const PROBE: Self = Self {
        chunks: 1,
        packets: 100,
        packet_size: 1024,
    };

    /// DV: one 480-byte data group per packet.
    pub const DV: Self = Self {
        chunks: 64,
        packets: 256,
        packet_size: 512,
    };

    /// MPEG-TS: up to three source packets per bus packet.
    pub const MPEG_TS: Self = Self {
        chunks: 8,
        packets: 4096,
        packet_size: 596,
    };

    /**
        Bytes returned by one full read.
    */
    pub const fn read_len(&self) -> usize {
        self.packets as usize * self.packet_size as usize
    }

    /**
        Check the geometry can be programmed at all.
    */
    pub fn validate(&self) -> Result<()> {
        if self.chunks == 0 || self.packets == 0 {
            return Err(Error::configuration(format!(
                "empty receive buffer: {} chunks of {} packets",
                self.chunks, self.packets
            )));
        }
        if (self.packet_size as usize) < ISO_HEADER_LEN + CIP_HEADER_LEN {
            return Err(Error::configuration(format!(
                "packet size {} cannot hold the packet headers",
                self.packet_size
            )));
        }
        Ok(())
    }
}

/**
    Channel and tag selection for the receive context.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelSelect {
    pub channel: u8,
    pub tag: u8,
}

impl ChannelSelect {
    pub const fn new(channel: u8, tag: u8) -> Self {
        Self { channel, tag }
    }

    pub fn validate(&self) -> Result<()> {
        if self.channel > MAX_CHANNEL {
            return Err(Error::configuration(format!(
                "channel {} out of range 0..={MAX_CHANNEL}",
                self.channel
            )));
        }
        if self.tag > MAX_TAG {
            return Err(Error::configuration(format!(
                "tag {} out of range 0..={MAX_TAG}",
                self.tag
            )));
        }
        Ok(())
    }
}

impl Default for ChannelSelect {
    /**
        Broadcast channel 63 with tag 1 (CIP headers present).
    */
    fn default() -> Self {
        Self { channel: 63, tag: 1 }
    }
}

/**
    Size and count of the destination buffers a capture owner should
    allocate for a format.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferGeometry {
    pub size: usize,
    pub count: usize,
}

impl BufferGeometry {
    /// One frame of the largest video system per buffer.
    pub const DV: Self = Self {
        size: VideoSystem::max_frame_len(),
        count: 8,
    };

    /// Every transport packet a full MPEG-TS read can carry.
    pub const MPEG_TS: Self = Self {
        size: ChannelGeometry::MPEG_TS.packets as usize * 3 * TS_PACKET_LEN,
        count: 8,
    };

    pub const fn with_count(self, count: usize) -> Self {
        Self {
            size: self.size,
            count,
        }
    }
}
