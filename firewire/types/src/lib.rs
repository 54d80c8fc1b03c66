/*!
    Shared wire types for the isochronous capture crates.

    This crate defines the vocabulary that crosses crate boundaries: the
    link and CIP headers found at the start of every received packet, DIF
    block accessors for DV payloads, and the fixed channel geometries for
    each supported stream format. It performs no I/O.

    # Wire Headers

    - [`IsoHeader`] - The link header quadlet written by the receive DMA
    - [`CipHeader`] - The two-quadlet Common Isochronous Packet header
    - [`DifBlock`] - A read-only view of one 80-byte DV block
    - [`SourcePacketHeader`] - The timestamp quadlet in front of each transport packet

    # Stream Properties

    - [`StreamFormat`] - DV or MPEG-TS, chosen from the CIP format id
    - [`VideoSystem`] - 525/60 or 625/50 frame geometry
    - [`Rational`] - Frame rates

    # Geometry

    - [`ChannelGeometry`] - Receive buffer programming for the device
    - [`ChannelSelect`] - Channel and tag selectors
    - [`BufferGeometry`] - Output pool sizing for a format

    # Error Handling

    - [`Error`] and [`Result`] - Common error types
*/

mod cip;
mod dif;
mod error;
mod format;
mod geometry;
mod iso;
mod rational;
mod source_packet;
mod system;

pub use cip::{CIP_HEADER_LEN, CipHeader, FMT_DV, FMT_MPEG_TS};
pub use dif::{
    DATA_GROUP_LEN, DIF_BLOCK_LEN, DIF_BLOCKS_PER_GROUP, DSF_FLAG, DifBlock, SectionType,
};
pub use error::{Error, Result};
pub use format::StreamFormat;
pub use geometry::{BufferGeometry, ChannelGeometry, ChannelSelect};
pub use iso::{ISO_HEADER_LEN, IsoHeader};
pub use rational::Rational;
pub use source_packet::{
    SOURCE_PACKET_HEADER_LEN, SOURCE_PACKET_LEN, SourcePacketHeader, TS_PACKET_LEN,
};
pub use system::VideoSystem;
