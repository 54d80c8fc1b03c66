/*!
    MPEG-TS source packets.

    Transport packets travel in 192-byte source packets: a big-endian
    timestamp quadlet followed by the 188-byte transport packet.

    ```text
    rsv:7 cycle_count:13 cycle_offset:12 | transport packet (188 bytes)
    ```
*/

/// Size of an MPEG transport packet.
pub const TS_PACKET_LEN: usize = 188;

/// Size of the source packet header.
pub const SOURCE_PACKET_HEADER_LEN: usize = 4;

/// Size of a source packet on the bus.
pub const SOURCE_PACKET_LEN: usize = SOURCE_PACKET_HEADER_LEN + TS_PACKET_LEN;

/**
    The timestamp quadlet in front of a transport packet.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourcePacketHeader(u32);

impl SourcePacketHeader {
    /**
        Read the header from the first four bytes of a source packet.
    */
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let quad: [u8; SOURCE_PACKET_HEADER_LEN] =
            bytes.get(..SOURCE_PACKET_HEADER_LEN)?.try_into().ok()?;
        Some(Self(u32::from_be_bytes(quad)))
    }

    /**
        Create a header from a cycle count and offset.
    */
    pub const fn new(cycle_count: u16, cycle_offset: u16) -> Self {
        Self((((cycle_count as u32) & 0x1fff) << 12) | ((cycle_offset as u32) & 0xfff))
    }

    /// Bus cycle count, 13 bits.
    #[inline]
    pub const fn cycle_count(self) -> u16 {
        ((self.0 >> 12) & 0x1fff) as u16
    }

    /// Offset within the cycle, 12 bits.
    #[inline]
    pub const fn cycle_offset(self) -> u16 {
        (self.0 & 0xfff) as u16
    }

    pub const fn to_bytes(self) -> [u8; SOURCE_PACKET_HEADER_LEN] {
        self.0.to_be_bytes()
    }
}
