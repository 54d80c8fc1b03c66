/*!
    Isochronous link header.

    Every packet in a receive buffer starts with one quadlet describing the
    packet as it appeared on the bus. The receive DMA stores it in host
    order (little-endian on the supported controllers):

    ```text
     31             16 15 14 13     8 7    4 3    0
    +-----------------+-----+--------+------+------+
    |   data_length   | tag | channel| tcode|  sy  |
    +-----------------+-----+--------+------+------+
    ```

    `data_length` counts the bytes that follow the link header, i.e. the
    CIP header plus the payload. There is no trailing CRC in the receive
    buffer.
*/

use crate::{Error, Result};

/// Size of the link header in bytes.
pub const ISO_HEADER_LEN: usize = 4;

/// Transaction code of an isochronous data block.
const TCODE_STREAM: u8 = 0xa;

/**
    The link header quadlet in front of each received packet.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IsoHeader(u32);

impl IsoHeader {
    /**
        Create a stream packet header for the given payload length,
        channel and tag.
    */
    pub const fn new(data_length: u16, channel: u8, tag: u8) -> Self {
        let q = ((data_length as u32) << 16)
            | (((tag & 0x3) as u32) << 14)
            | (((channel & 0x3f) as u32) << 8)
            | ((TCODE_STREAM as u32) << 4);
        Self(q)
    }

    /**
        Read the header from the first four bytes of `bytes`.
    */
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let quad: [u8; ISO_HEADER_LEN] = bytes
            .get(..ISO_HEADER_LEN)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| {
                Error::invalid_data(format!(
                    "link header needs {ISO_HEADER_LEN} bytes, have {}",
                    bytes.len()
                ))
            })?;
        Ok(Self(u32::from_le_bytes(quad)))
    }

    /**
        Bytes following the link header (CIP header plus payload).
    */
    #[inline]
    pub const fn data_length(self) -> usize {
        (self.0 >> 16) as usize
    }

    /// Tag selector, bits 15..14.
    #[inline]
    pub const fn tag(self) -> u8 {
        ((self.0 >> 14) & 0x3) as u8
    }

    /// Channel number, bits 13..8.
    #[inline]
    pub const fn channel(self) -> u8 {
        ((self.0 >> 8) & 0x3f) as u8
    }

    /// Transaction code, bits 7..4.
    #[inline]
    pub const fn tcode(self) -> u8 {
        ((self.0 >> 4) & 0xf) as u8
    }

    /// Synchronisation code, bits 3..0.
    #[inline]
    pub const fn sy(self) -> u8 {
        (self.0 & 0xf) as u8
    }

    /**
        Encode the header the way the receive DMA stores it.
    */
    pub const fn to_bytes(self) -> [u8; ISO_HEADER_LEN] {
        self.0.to_le_bytes()
    }
}
