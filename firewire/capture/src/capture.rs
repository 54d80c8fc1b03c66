/*!
    The capture loop run by the producer thread.
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use firewire_demux::{Demuxer, FrameDemuxer};
use firewire_device::IsoDevice;

use crate::clock::Clock;
use crate::pool::{BufferPool, PooledFrame};
use crate::sink::{CapturedUnit, FrameSink};
use crate::stats::CaptureStats;

/// Sink shared between the session owner and the capture thread.
pub(crate) type SharedSink = Arc<Mutex<Box<dyn FrameSink>>>;

/**
    Why the loop stopped reading.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// The owner asked it to stop.
    Stopped,
    /// The device returned no more data.
    EndOfStream,
    /// Too many hard read errors in a row.
    ReadErrors,
}

enum Step {
    Continue,
    Exit(LoopExit),
}

pub(crate) struct CaptureLoop<D> {
    pub device: D,
    pub demuxer: Demuxer,
    pub pool: BufferPool,
    pub sink: SharedSink,
    pub clock: Arc<dyn Clock>,
    pub stop: Arc<AtomicBool>,
    pub stats: Arc<CaptureStats>,
    pub buffer_timeout: Duration,
    pub max_read_errors: usize,
    pub read_len: usize,
}

/**
    State the loop owns exclusively while running.
*/
struct Running {
    raw: Vec<u8>,
    pending: Option<PooledFrame>,
    sequence: u64,
    consecutive_errors: usize,
}

impl<D: IsoDevice> CaptureLoop<D> {
    /**
        Read, demux and hand off until stopped.

        Returns the device so the session can reuse or close it.
    */
    pub fn run(mut self) -> (D, LoopExit) {
        let mut state = Running {
            raw: vec![0u8; self.read_len],
            pending: None,
            sequence: 0,
            consecutive_errors: 0,
        };
        tracing::debug!(read_len = self.read_len, "capture loop started");

        let exit = loop {
            if self.stop.load(Ordering::Acquire) {
                break LoopExit::Stopped;
            }
            if let Step::Exit(exit) = self.step(&mut state) {
                break exit;
            }
        };

        if let Some(pending) = state.pending.take().filter(|p| !p.is_empty()) {
            tracing::debug!(bytes = pending.len(), "dropping unit in progress");
        }
        tracing::debug!(?exit, units = state.sequence, "capture loop finished");
        (self.device, exit)
    }

    fn step(&mut self, state: &mut Running) -> Step {
        let len = match self.device.read(&mut state.raw) {
            Ok(0) => return Step::Exit(LoopExit::EndOfStream),
            Ok(len) => len,
            Err(e) if e.is_transient() => {
                self.stats.record_not_ready();
                tracing::debug!(error = %e, "device not ready");
                return Step::Continue;
            }
            Err(e) => {
                self.stats.record_read_error();
                state.consecutive_errors += 1;
                tracing::error!(
                    error = %e,
                    consecutive = state.consecutive_errors,
                    "device read failed"
                );
                if state.consecutive_errors >= self.max_read_errors {
                    return Step::Exit(LoopExit::ReadErrors);
                }
                return Step::Continue;
            }
        };
        state.consecutive_errors = 0;
        self.stats.record_read(len);

        self.process(state, len);
        self.stats.sync_demux(self.demuxer.counters());
        Step::Continue
    }

    /**
        Demux `state.raw[..len]` into as many destinations as it takes.
    */
    fn process(&mut self, state: &mut Running, len: usize) {
        let mut cursor = 0;
        while cursor < len {
            let mut frame = match state.pending.take() {
                Some(frame) => frame,
                None => match self.pool.acquire(self.buffer_timeout) {
                    Ok(frame) => frame,
                    Err(_) => {
                        self.stats.record_buffer_timeout();
                        tracing::warn!(
                            dropped = len - cursor,
                            "no destination buffer available, dropping chunk"
                        );
                        return;
                    }
                },
            };

            match self.demuxer.demux(&state.raw[cursor..len], &mut frame) {
                Ok(consumed) => {
                    cursor += consumed;
                    if frame.is_complete() {
                        self.hand_off(state, frame);
                    } else {
                        state.pending = Some(frame);
                        if consumed == 0 {
                            break;
                        }
                    }
                }
                Err(e) => {
                    self.stats.record_demux_error();
                    tracing::warn!(
                        error = %e,
                        dropped = len - cursor,
                        "demux failed, dropping chunk"
                    );
                    drop(frame);
                    self.demuxer.discard_unit();
                    return;
                }
            }
        }
    }

    fn hand_off(&mut self, state: &mut Running, frame: PooledFrame) {
        if frame.is_empty() {
            return;
        }
        let bytes = frame.len();
        let unit = CapturedUnit {
            buffer: frame,
            format: self.demuxer.format(),
            system: self.demuxer.video_system(),
            sequence: state.sequence,
            timestamp: self.clock.elapsed(),
        };
        state.sequence += 1;
        let duration = unit.duration();

        match self.sink.lock().deliver(unit) {
            Ok(()) => self.stats.record_delivery(bytes, duration),
            Err(e) => {
                self.stats.record_handoff_failure();
                tracing::debug!(error = %e, "sink refused unit");
            }
        }
    }
}
