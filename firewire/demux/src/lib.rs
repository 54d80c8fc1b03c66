/*!
    DV and MPEG-TS demultiplexing of raw isochronous packets.

    A raw buffer from the device holds packets back to back, each a link
    header, a CIP header and a payload. The demuxers in this crate walk
    those packets and append the elementary data to a caller supplied
    [`OutputFrame`]:

    - [`DvDemuxer`] - Reassembles fixed-size DV frames from 480-byte data
      groups, padding frames that lost groups on the bus
    - [`MpegTsDemuxer`] - Extracts 188-byte transport packets once the
      stream is aligned to a source packet boundary

    Both implement [`FrameDemuxer`]. A session picks one through
    [`Demuxer::for_format`] and keeps it for its whole lifetime.

    # Output Units

    A demuxer decides where the output stream is cut. It marks the
    destination complete when a unit is ready to hand off (a finished DV
    frame, or a run of transport packets) and leaves it incomplete when
    it needs more input to finish the unit.

    ```ignore
    let mut demuxer = Demuxer::for_format(StreamFormat::Dv);
    let mut out = OutputFrame::with_capacity(BufferGeometry::DV.size);

    let mut cursor = 0;
    while cursor < raw.len() {
        cursor += demuxer.demux(&raw[cursor..], &mut out)?;
        if out.is_complete() {
            deliver(&out);
            out.clear();
        }
    }
    ```
*/

mod dv;
mod error;
mod mpegts;
mod output;
mod packet;

pub use dv::{DvDemuxer, padding_strides};
pub use error::DemuxError;
pub use mpegts::{MpegTsDemuxer, SUPPORTED_FRACTION_NUMBER};
pub use output::OutputFrame;
pub use packet::RawPacket;

pub use firewire_types::{StreamFormat, VideoSystem};

/**
    Running totals a demuxer keeps for its session.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DemuxCounters {
    /// DV frame starts seen.
    pub frames: u64,
    /// DV data groups of padding written.
    pub padded_strides: u64,
    /// Transport packets written.
    pub transport_packets: u64,
}

/**
    Turns raw packets into elementary stream data.
*/
pub trait FrameDemuxer: Send {
    /**
        Consume packets from the start of `raw`, appending output to `out`.

        Returns the number of bytes of `raw` consumed, always a whole
        number of packets. Fails only when the first packet cannot be
        handled; when earlier packets succeeded the call returns their
        length and the next call reports the failure.
    */
    fn demux(&mut self, raw: &[u8], out: &mut OutputFrame) -> Result<usize, DemuxError>;

    /**
        Forget the unit in progress after its destination was discarded.
    */
    fn discard_unit(&mut self) {}

    /// The stream format this demuxer accepts.
    fn format(&self) -> StreamFormat;

    fn counters(&self) -> DemuxCounters;
}

/**
    The demuxer chosen for a session.
*/
#[derive(Debug)]
pub enum Demuxer {
    Dv(DvDemuxer),
    MpegTs(MpegTsDemuxer),
}

impl Demuxer {
    /**
        Create a fresh demuxer with empty session state for `format`.
    */
    pub fn for_format(format: StreamFormat) -> Self {
        match format {
            StreamFormat::Dv => Self::Dv(DvDemuxer::new()),
            StreamFormat::MpegTs => Self::MpegTs(MpegTsDemuxer::new()),
        }
    }

    /**
        The latched video system of a DV session.
    */
    pub fn video_system(&self) -> Option<VideoSystem> {
        match self {
            Self::Dv(dv) => dv.system(),
            Self::MpegTs(_) => None,
        }
    }
}

impl FrameDemuxer for Demuxer {
    fn demux(&mut self, raw: &[u8], out: &mut OutputFrame) -> Result<usize, DemuxError> {
        match self {
            Self::Dv(dv) => dv.demux(raw, out),
            Self::MpegTs(ts) => ts.demux(raw, out),
        }
    }

    fn discard_unit(&mut self) {
        match self {
            Self::Dv(dv) => dv.discard_unit(),
            Self::MpegTs(ts) => ts.discard_unit(),
        }
    }

    fn format(&self) -> StreamFormat {
        match self {
            Self::Dv(dv) => dv.format(),
            Self::MpegTs(ts) => ts.format(),
        }
    }

    fn counters(&self) -> DemuxCounters {
        match self {
            Self::Dv(dv) => dv.counters(),
            Self::MpegTs(ts) => ts.counters(),
        }
    }
}

// The demuxer moves into the capture thread
static_assertions::assert_impl_all!(Demuxer: Send);
