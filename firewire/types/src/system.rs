/*!
    Video system (frame geometry) of a DV stream.
*/

use std::fmt;

use crate::{DATA_GROUP_LEN, Rational};

/**
    The two DV frame geometries.

    The system is read once from the 50/60 flag of the CIP header that
    accompanies the first frame start, and stays fixed for the session.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VideoSystem {
    /// System A: 525 lines, 29.97 frames per second.
    Ntsc,
    /// System B: 625 lines, 25 frames per second.
    Pal,
}

impl VideoSystem {
    /**
        Select the system from the CIP 50/60 flag.
    */
    pub const fn from_fs(fs: bool) -> Self {
        if fs { Self::Pal } else { Self::Ntsc }
    }

    /**
        Data groups (480-byte strides) in one frame.
    */
    pub const fn blocks_per_frame(self) -> usize {
        match self {
            Self::Ntsc => 250,
            Self::Pal => 300,
        }
    }

    /**
        DIF sequences in one frame.
    */
    pub const fn dif_sequences(self) -> usize {
        match self {
            Self::Ntsc => 10,
            Self::Pal => 12,
        }
    }

    /**
        Nominal frame rate.
    */
    pub const fn frame_rate(self) -> Rational {
        match self {
            Self::Ntsc => Rational::new(30000, 1001),
            Self::Pal => Rational::new(25, 1),
        }
    }

    /**
        Size of one complete frame in bytes.
    */
    pub const fn frame_len(self) -> usize {
        self.blocks_per_frame() * DATA_GROUP_LEN
    }

    /**
        Size of the largest frame of any system.
    */
    pub const fn max_frame_len() -> usize {
        Self::Pal.frame_len()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Ntsc => "NTSC",
            Self::Pal => "PAL",
        }
    }
}

impl fmt::Display for VideoSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
