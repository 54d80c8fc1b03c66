use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;

use firewire_demux::Demuxer;
use firewire_device::{ChannelConfigurator, IsoDevice};
use firewire_types::{
    BufferGeometry, ChannelGeometry, ChannelSelect, Error, Result, StreamFormat,
};

use crate::capture::{CaptureLoop, LoopExit, SharedSink};
use crate::clock::{Clock, WallClock};
use crate::detect;
use crate::pool::BufferPool;
use crate::sink::FrameSink;
use crate::stats::{CaptureStats, StatsSnapshot};

/// Default wait for a free destination buffer.
pub const DEFAULT_BUFFER_TIMEOUT: Duration = Duration::from_millis(50);

/// Default number of consecutive hard read errors before the loop gives up.
pub const DEFAULT_MAX_READ_ERRORS: usize = 16;

/**
    Where a session is in its lifecycle.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    NotConfigured,
    /// Probe geometry applied, format unknown.
    Configured,
    FormatDetected(StreamFormat),
    Capturing(StreamFormat),
    Stopping,
    Stopped,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(f, "not configured"),
            Self::Configured => write!(f, "configured"),
            Self::FormatDetected(format) => write!(f, "{format} detected"),
            Self::Capturing(format) => write!(f, "capturing {format}"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/**
    Options for a capture session.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CaptureOptions {
    pub select: ChannelSelect,
    /// How long the loop waits for a free destination before dropping a chunk.
    pub buffer_timeout: Duration,
    /// Destination buffers in the pool, overriding the format default.
    pub pool_count: Option<usize>,
    pub max_read_errors: usize,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            select: ChannelSelect::default(),
            buffer_timeout: DEFAULT_BUFFER_TIMEOUT,
            pool_count: None,
            max_read_errors: DEFAULT_MAX_READ_ERRORS,
        }
    }
}

/**
    Drives one device through configuration, format detection and capture.

    ```ignore
    let mut session = CaptureSession::new(device, CaptureOptions::default());
    session.configure()?;
    let format = session.detect_format()?;
    let (sink, units) = ChannelSink::bounded(8);
    session.start(sink)?;

    for unit in units {
        write(&unit)?;
    }
    let stats = session.stop();
    ```

    Capture runs on a dedicated thread named `fw-capture`. Stopping is
    cooperative: the thread checks a flag between reads, so a read or
    demux in flight always finishes first. Dropping a capturing session
    stops it.
*/
pub struct CaptureSession<D: IsoDevice + 'static> {
    device: Option<D>,
    configurator: ChannelConfigurator,
    options: CaptureOptions,
    state: SessionState,
    demuxer: Option<Demuxer>,
    pool: Option<BufferPool>,
    clock: Arc<dyn Clock>,
    stop_flag: Arc<AtomicBool>,
    stats: Arc<CaptureStats>,
    handle: Option<JoinHandle<(D, LoopExit)>>,
    exit: Option<LoopExit>,
}

impl<D: IsoDevice + 'static> CaptureSession<D> {
    pub fn new(device: D, options: CaptureOptions) -> Self {
        Self {
            device: Some(device),
            configurator: ChannelConfigurator::new(options.select),
            options,
            state: SessionState::NotConfigured,
            demuxer: None,
            pool: None,
            clock: Arc::new(WallClock::new()),
            stop_flag: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(CaptureStats::new()),
            handle: None,
            exit: None,
        }
    }

    /**
        Use `clock` for capture timestamps instead of wall time.
    */
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn options(&self) -> &CaptureOptions {
        &self.options
    }

    /**
        The detected stream format, if detection has succeeded.
    */
    pub fn format(&self) -> Option<StreamFormat> {
        match self.state {
            SessionState::FormatDetected(format) | SessionState::Capturing(format) => Some(format),
            _ => None,
        }
    }

    /**
        Program the device with the probe geometry.

        May be called again while the format is still unknown.
    */
    pub fn configure(&mut self) -> Result<()> {
        if !matches!(
            self.state,
            SessionState::NotConfigured | SessionState::Configured
        ) {
            return Err(self.wrong_state("configure"));
        }
        let device = self.device.as_mut().ok_or_else(device_taken)?;
        self.configurator.apply(device, ChannelGeometry::PROBE)?;
        self.state = SessionState::Configured;
        Ok(())
    }

    /**
        Read once, classify the stream and prepare capture for it.

        On success the device is reprogrammed with the format's full
        geometry and the demuxer and destination pool are allocated. On
        failure the session stays configured and detection may be retried;
        a not-ready device is reported as a transient read error.
    */
    pub fn detect_format(&mut self) -> Result<StreamFormat> {
        if self.state != SessionState::Configured {
            return Err(self.wrong_state("detect the format"));
        }
        let device = self.device.as_mut().ok_or_else(device_taken)?;
        let format = detect::probe(device, &mut self.configurator)?;
        self.configurator.apply(device, format.channel_geometry())?;

        let mut geometry = format.buffer_geometry();
        if let Some(count) = self.options.pool_count {
            geometry = geometry.with_count(count);
        }
        if geometry.count == 0 {
            return Err(Error::configuration("destination pool needs at least one buffer"));
        }
        tracing::info!(
            %format,
            buffer_size = geometry.size,
            buffer_count = geometry.count,
            "capture prepared"
        );

        self.demuxer = Some(Demuxer::for_format(format));
        self.pool = Some(BufferPool::new(geometry));
        self.state = SessionState::FormatDetected(format);
        Ok(format)
    }

    /**
        Size and count of the destination buffers, once the format is known.
    */
    pub fn buffer_geometry(&self) -> Option<BufferGeometry> {
        self.pool.as_ref().map(BufferPool::geometry)
    }

    /**
        Spawn the capture thread, handing completed units to `sink`.
    */
    pub fn start<S: FrameSink + 'static>(&mut self, sink: S) -> Result<()> {
        let SessionState::FormatDetected(format) = self.state else {
            return Err(self.wrong_state("start capture"));
        };
        let (Some(device), Some(demuxer), Some(pool)) =
            (self.device.take(), self.demuxer.take(), self.pool.clone())
        else {
            return Err(Error::invalid_state("session resources are missing"));
        };

        let sink: SharedSink = Arc::new(Mutex::new(Box::new(sink)));
        let capture = CaptureLoop {
            device,
            demuxer,
            pool,
            sink,
            clock: Arc::clone(&self.clock),
            stop: Arc::clone(&self.stop_flag),
            stats: Arc::clone(&self.stats),
            buffer_timeout: self.options.buffer_timeout,
            max_read_errors: self.options.max_read_errors.max(1),
            read_len: format.channel_geometry().read_len(),
        };

        self.stop_flag.store(false, Ordering::Release);
        let handle = match thread::Builder::new()
            .name("fw-capture".into())
            .spawn(move || capture.run())
        {
            Ok(handle) => handle,
            Err(e) => {
                self.state = SessionState::Stopped;
                return Err(Error::invalid_state(format!(
                    "failed to spawn capture thread: {e}"
                )));
            }
        };

        tracing::info!(%format, "capture started");
        self.handle = Some(handle);
        self.state = SessionState::Capturing(format);
        Ok(())
    }

    /**
        Whether the capture thread has exited on its own.

        It does so at the end of a finite stream or after too many
        consecutive read errors. [`stop`](Self::stop) still needs to be
        called to collect it.
    */
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_some_and(JoinHandle::is_finished)
    }

    /**
        Stop capturing and wait for the capture thread.

        Returns the final statistics. Does nothing but report statistics
        when the session is not capturing.
    */
    pub fn stop(&mut self) -> StatsSnapshot {
        if let Some(handle) = self.handle.take() {
            self.state = SessionState::Stopping;
            self.stop_flag.store(true, Ordering::Release);

            match handle.join() {
                Ok((device, exit)) => {
                    self.device = Some(device);
                    self.exit = Some(exit);
                }
                Err(_) => tracing::error!("capture thread panicked"),
            }
            // Units still held downstream keep their buffers alive
            self.pool = None;
            self.state = SessionState::Stopped;

            let stats = self.stats.snapshot();
            tracing::info!(
                units = stats.units_delivered,
                bytes = stats.bytes_delivered,
                exit = ?self.exit,
                "capture stopped"
            );
        }
        self.stats.snapshot()
    }

    /**
        Why the capture thread exited, once it has been stopped.
    */
    pub fn exit_reason(&self) -> Option<LoopExit> {
        self.exit
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /**
        Stop the session and take back the device.
    */
    pub fn into_device(mut self) -> Option<D> {
        self.stop();
        self.device.take()
    }

    fn wrong_state(&self, action: &str) -> Error {
        Error::invalid_state(format!("cannot {action} while {}", self.state))
    }
}

fn device_taken() -> Error {
    Error::invalid_state("device is owned by the capture thread")
}

impl<D: IsoDevice + 'static> Drop for CaptureSession<D> {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}

impl<D: IsoDevice + 'static> fmt::Debug for CaptureSession<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("options", &self.options)
            .field("geometry", &self.configurator.geometry())
            .finish()
    }
}
