/*!
    Capture sessions for DV and MPEG-TS streams on an isochronous channel.

    A [`CaptureSession`] takes an [`IsoDevice`] through its lifecycle:

    1. [`configure`](CaptureSession::configure) programs a small probe
       geometry on the channel
    2. [`detect_format`](CaptureSession::detect_format) reads once and
       picks the demuxer from the CIP format id, then reprograms the
       channel with the format's full geometry
    3. [`start`](CaptureSession::start) spawns the capture thread, which
       reads raw buffers, demuxes them into pooled destination buffers
       and hands completed units to a [`FrameSink`]
    4. [`stop`](CaptureSession::stop) asks the thread to finish and
       joins it

    # Backpressure

    Destination buffers come from a fixed [`BufferPool`]. When the pool
    stays empty for longer than the configured timeout the rest of the
    current raw buffer is dropped; the capture thread never blocks on a
    slow consumer indefinitely. A sink may also refuse a unit, which
    returns its buffer to the pool.
*/

mod capture;
mod clock;
mod detect;
mod pool;
mod session;
mod sink;
mod stats;

pub use capture::LoopExit;
pub use clock::{Clock, WallClock};
pub use detect::{PROBE_READ_LEN, classify, probe};
pub use pool::{BufferPool, PooledFrame};
pub use session::{
    CaptureOptions, CaptureSession, DEFAULT_BUFFER_TIMEOUT, DEFAULT_MAX_READ_ERRORS, SessionState,
};
pub use sink::{CapturedUnit, ChannelSink, FrameSink, SinkError};
pub use stats::{CaptureStats, StatsSnapshot};

pub use firewire_device::IsoDevice;
pub use firewire_types::{BufferGeometry, ChannelSelect, Error, Result, StreamFormat, VideoSystem};
