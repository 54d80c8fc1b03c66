/*!
    Common Isochronous Packet header.

    Two big-endian quadlets directly after the link header:

    ```text
    q0:  eoh0:1 form0:1 sid:6 | dbs:8 | fn:2 qpc:3 sph:1 rsv:2 | dbc:8
    q1:  eoh1:1 form1:1 fmt:6 | fdf:24
    ```

    For DV the top bit of `fdf` is the 50/60 flag, followed by five bits of
    signal type and, in the low 16 bits, the SYT timestamp.
*/

use crate::{Error, Result, StreamFormat, VideoSystem};

/// Size of the CIP header in bytes.
pub const CIP_HEADER_LEN: usize = 8;

/// CIP format id of a DV stream.
pub const FMT_DV: u8 = 0x00;

/// CIP format id of an MPEG-TS stream.
pub const FMT_MPEG_TS: u8 = 0x20;

/**
    A view of the eight CIP header bytes.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CipHeader([u8; CIP_HEADER_LEN]);

impl CipHeader {
    /**
        Read the header from the first eight bytes of `bytes`.
    */
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        bytes
            .get(..CIP_HEADER_LEN)
            .and_then(|b| b.try_into().ok())
            .map(Self)
            .ok_or_else(|| {
                Error::invalid_data(format!(
                    "CIP header needs {CIP_HEADER_LEN} bytes, have {}",
                    bytes.len()
                ))
            })
    }

    /**
        Header of a DV packet with the given data block counter and
        video system.
    */
    pub const fn dv(dbc: u8, system: VideoSystem) -> Self {
        let fs = match system {
            VideoSystem::Ntsc => 0x00,
            VideoSystem::Pal => 0x80,
        };
        // dbs = 120 quadlets (one 480 byte data group), fn = 0
        Self([0x00, 120, 0x00, dbc, 0x80 | FMT_DV, fs, 0xff, 0xff])
    }

    /**
        Header of an MPEG-TS packet with the given fraction number and
        data block counter.
    */
    pub const fn mpeg_ts(fraction_number: u8, dbc: u8) -> Self {
        // dbs = 6 quadlets (one eighth of a source packet), sph = 1
        let fn_qpc_sph = ((fraction_number & 0x3) << 6) | 0x04;
        Self([0x00, 6, fn_qpc_sph, dbc, 0x80 | FMT_MPEG_TS, 0x00, 0x00, 0x00])
    }

    /// Source node id, low six bits of byte 0.
    #[inline]
    pub const fn source_id(self) -> u8 {
        self.0[0] & 0x3f
    }

    /// Data block size in quadlets.
    #[inline]
    pub const fn data_block_size(self) -> u8 {
        self.0[1]
    }

    /// Fraction number, top two bits of byte 2.
    #[inline]
    pub const fn fraction_number(self) -> u8 {
        self.0[2] >> 6
    }

    /// Quadlet padding count, bits 5..3 of byte 2.
    #[inline]
    pub const fn quadlet_padding(self) -> u8 {
        (self.0[2] >> 3) & 0x7
    }

    /// Source packet header flag, bit 2 of byte 2.
    #[inline]
    pub const fn has_source_packet_header(self) -> bool {
        self.0[2] & 0x04 != 0
    }

    /// Data block counter.
    #[inline]
    pub const fn dbc(self) -> u8 {
        self.0[3]
    }

    /// Format id, low six bits of byte 4.
    #[inline]
    pub const fn format_id(self) -> u8 {
        self.0[4] & 0x3f
    }

    /// The 24-bit format dependent field.
    #[inline]
    pub const fn fdf(self) -> u32 {
        ((self.0[5] as u32) << 16) | ((self.0[6] as u32) << 8) | self.0[7] as u32
    }

    /**
        The DV 50/60 flag, top bit of the format dependent field.
        Only meaningful for DV packets.
    */
    #[inline]
    pub const fn dv_fs(self) -> bool {
        self.0[5] & 0x80 != 0
    }

    /// The DV signal type, bits 6..2 of byte 5.
    #[inline]
    pub const fn dv_stype(self) -> u8 {
        (self.0[5] >> 2) & 0x1f
    }

    /**
        The stream format named by the format id, if it is one we handle.
    */
    pub fn format(self) -> Option<StreamFormat> {
        StreamFormat::from_format_id(self.format_id())
    }

    /**
        The raw header bytes.
    */
    pub const fn to_bytes(self) -> [u8; CIP_HEADER_LEN] {
        self.0
    }
}
