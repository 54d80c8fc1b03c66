use firewire_types::{Error, StreamFormat};
use thiserror::Error;

/**
    Failure to demultiplex a packet.
*/
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DemuxError {
    #[error("expected {expected} packet, got CIP format id {found:#04x}")]
    WrongFormat { expected: StreamFormat, found: u8 },

    #[error("unsupported MPEG-TS fraction number {0} (only 3 is supported)")]
    UnsupportedFractionNumber(u8),

    #[error("truncated packet: need {needed} bytes, have {have}")]
    Truncated { needed: usize, have: usize },

    #[error("destination of {capacity} bytes cannot hold {needed} bytes of output")]
    DestinationTooSmall { needed: usize, capacity: usize },
}

impl DemuxError {
    /**
        True for the errors that mean the packet is not in a format this
        demuxer handles.
    */
    pub fn is_unsupported_format(&self) -> bool {
        matches!(
            self,
            Self::WrongFormat { .. } | Self::UnsupportedFractionNumber(_)
        )
    }
}

impl From<DemuxError> for Error {
    fn from(e: DemuxError) -> Self {
        match e {
            DemuxError::WrongFormat { .. } | DemuxError::UnsupportedFractionNumber(_) => {
                Error::unsupported_format(e.to_string())
            }
            DemuxError::Truncated { .. } => Error::invalid_data(e.to_string()),
            DemuxError::DestinationTooSmall { .. } => Error::configuration(e.to_string()),
        }
    }
}
