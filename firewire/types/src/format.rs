/*!
    Stream format carried on an isochronous channel.
*/

use std::fmt;

use crate::{BufferGeometry, ChannelGeometry, FMT_DV, FMT_MPEG_TS};

/**
    Stream formats the capture engine can demultiplex.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamFormat {
    /// DV (IEC 61834) frames.
    Dv,
    /// MPEG-2 transport stream.
    MpegTs,
}

impl StreamFormat {
    /**
        Map a CIP format id to a stream format.
    */
    pub const fn from_format_id(id: u8) -> Option<Self> {
        match id {
            FMT_DV => Some(Self::Dv),
            FMT_MPEG_TS => Some(Self::MpegTs),
            _ => None,
        }
    }

    /**
        CIP format id of this format.
    */
    pub const fn format_id(self) -> u8 {
        match self {
            Self::Dv => FMT_DV,
            Self::MpegTs => FMT_MPEG_TS,
        }
    }

    /**
        Receive buffer geometry to program once this format is detected.
    */
    pub const fn channel_geometry(self) -> ChannelGeometry {
        match self {
            Self::Dv => ChannelGeometry::DV,
            Self::MpegTs => ChannelGeometry::MPEG_TS,
        }
    }

    /**
        Output pool geometry for this format.
    */
    pub const fn buffer_geometry(self) -> BufferGeometry {
        match self {
            Self::Dv => BufferGeometry::DV,
            Self::MpegTs => BufferGeometry::MPEG_TS,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Dv => "DV",
            Self::MpegTs => "MPEG-TS",
        }
    }

    /**
        Conventional file extension for a capture of this format.
    */
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Dv => "dv",
            Self::MpegTs => "ts",
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
