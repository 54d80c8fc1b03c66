/*!
    Session statistics.
*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

use firewire_demux::DemuxCounters;

/**
    Counters updated by the capture thread and read by anyone.

    Every field is an independent relaxed atomic; a snapshot is not a
    consistent cut across counters.
*/
#[derive(Debug, Default)]
pub struct CaptureStats {
    reads: AtomicU64,
    not_ready: AtomicU64,
    read_errors: AtomicU64,
    bytes_read: AtomicU64,
    units_delivered: AtomicU64,
    bytes_delivered: AtomicU64,
    buffer_timeouts: AtomicU64,
    demux_errors: AtomicU64,
    handoff_failures: AtomicU64,
    padded_strides: AtomicU64,
    dv_frames: AtomicU64,
    transport_packets: AtomicU64,
    media_time_us: AtomicU64,
}

/**
    Point-in-time copy of [`CaptureStats`].
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub reads: u64,
    pub not_ready: u64,
    pub read_errors: u64,
    pub bytes_read: u64,
    pub units_delivered: u64,
    pub bytes_delivered: u64,
    pub buffer_timeouts: u64,
    pub demux_errors: u64,
    pub handoff_failures: u64,
    pub padded_strides: u64,
    pub dv_frames: u64,
    pub transport_packets: u64,
    /// Playing time of the delivered DV frames, in microseconds.
    pub media_time_us: u64,
}

impl CaptureStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_read(&self, bytes: usize) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_not_ready(&self) {
        self.not_ready.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_read_error(&self) {
        self.read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery(&self, bytes: usize, duration: Option<Duration>) {
        self.units_delivered.fetch_add(1, Ordering::Relaxed);
        self.bytes_delivered.fetch_add(bytes as u64, Ordering::Relaxed);
        if let Some(duration) = duration {
            self.media_time_us
                .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_buffer_timeout(&self) {
        self.buffer_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_demux_error(&self) {
        self.demux_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_handoff_failure(&self) {
        self.handoff_failures.fetch_add(1, Ordering::Relaxed);
    }

    /**
        Mirror the demuxer's running totals.
    */
    pub(crate) fn sync_demux(&self, counters: DemuxCounters) {
        self.padded_strides
            .store(counters.padded_strides, Ordering::Relaxed);
        self.dv_frames.store(counters.frames, Ordering::Relaxed);
        self.transport_packets
            .store(counters.transport_packets, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        StatsSnapshot {
            reads: load(&self.reads),
            not_ready: load(&self.not_ready),
            read_errors: load(&self.read_errors),
            bytes_read: load(&self.bytes_read),
            units_delivered: load(&self.units_delivered),
            bytes_delivered: load(&self.bytes_delivered),
            buffer_timeouts: load(&self.buffer_timeouts),
            demux_errors: load(&self.demux_errors),
            handoff_failures: load(&self.handoff_failures),
            padded_strides: load(&self.padded_strides),
            dv_frames: load(&self.dv_frames),
            transport_packets: load(&self.transport_packets),
            media_time_us: load(&self.media_time_us),
        }
    }
}

static_assertions::assert_impl_all!(CaptureStats: Send, Sync);
