/*!
    Error types for the isochronous capture crates.
*/

use thiserror::Error;

/**
    Error type shared by the capture crates.
*/
#[derive(Debug, Error)]
pub enum Error {
    /// Programming the receive buffer or channel selection failed.
    #[error("configuration failed: {message}")]
    ConfigurationFailed { message: String },
    /// The device read returned an error.
    #[error("read failed: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Unknown CIP format id or an unsupported variant of a known one.
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },
    /// No destination buffer became available in time.
    #[error("timed out waiting for a destination buffer")]
    BufferTimeout,
    /// Malformed or truncated packet data.
    #[error("invalid data: {message}")]
    InvalidData { message: String },
    /// An operation was attempted in the wrong session state.
    #[error("invalid state: {message}")]
    InvalidState { message: String },
}

impl Error {
    /**
        Create a configuration error with the given message.
    */
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationFailed {
            message: message.into(),
        }
    }

    /**
        Create an unsupported format error with the given message.
    */
    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /**
        Create an invalid data error with the given message.
    */
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /**
        Create an invalid state error with the given message.
    */
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /**
        Returns true if this is a read error that is expected to clear
        up on its own (the device had no data ready yet).
    */
    pub fn is_transient(&self) -> bool {
        match self {
            Self::ReadFailed(e) => matches!(
                e.kind(),
                std::io::ErrorKind::WouldBlock | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }
}

/**
    Result type alias for the capture crates.
*/
pub type Result<T> = std::result::Result<T, Error>;

// Errors cross the capture thread boundary
static_assertions::assert_impl_all!(Error: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;
    use std::io;

    #[test]
    fn error_display() {
        let e = Error::configuration("channel 70 out of range");
        assert_eq!(
            format!("{e}"),
            "configuration failed: channel 70 out of range"
        );

        let e = Error::unsupported_format("fmt 0x01");
        assert_eq!(format!("{e}"), "unsupported format: fmt 0x01");

        let e = Error::BufferTimeout;
        assert_eq!(
            format!("{e}"),
            "timed out waiting for a destination buffer"
        );
    }

    #[test]
    fn would_block_is_transient() {
        let e: Error = io::Error::from(io::ErrorKind::WouldBlock).into();
        assert!(e.is_transient());

        let e: Error = io::Error::from(io::ErrorKind::Interrupted).into();
        assert!(e.is_transient());
    }

    #[test]
    fn hard_errors_are_not_transient() {
        let e: Error = io::Error::from(io::ErrorKind::BrokenPipe).into();
        assert!(!e.is_transient());
        assert!(!Error::BufferTimeout.is_transient());
        assert!(!Error::unsupported_format("x").is_transient());
    }

    #[test]
    fn read_error_has_source() {
        let e: Error = io::Error::other("bus reset").into();
        assert!(StdError::source(&e).is_some());
        assert!(StdError::source(&Error::BufferTimeout).is_none());
    }
}
