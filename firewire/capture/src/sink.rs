/*!
    The boundary between the capture thread and its consumer.
*/

use std::ops::Deref;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TrySendError};
use thiserror::Error;

use firewire_types::{StreamFormat, VideoSystem};

use crate::pool::PooledFrame;

/**
    One completed output unit: a DV frame or a run of transport packets.

    The buffer belongs to the session's pool and goes back to it when the
    unit is dropped, so consumers should not hold on to units longer than
    they need to.
*/
#[derive(Debug)]
pub struct CapturedUnit {
    pub buffer: PooledFrame,
    pub format: StreamFormat,
    /// Latched video system of a DV session.
    pub system: Option<VideoSystem>,
    /// Counts units offered to the sink from zero; gaps mark refused units.
    pub sequence: u64,
    /// Capture time relative to the start of the session.
    pub timestamp: Duration,
}

impl CapturedUnit {
    pub fn data(&self) -> &[u8] {
        self.buffer.as_slice()
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /**
        Playing time of the unit: one frame period for DV, unknown for
        transport packets.
    */
    pub fn duration(&self) -> Option<Duration> {
        match self.format {
            StreamFormat::Dv => self.system.map(|s| s.frame_rate().period()),
            StreamFormat::MpegTs => None,
        }
    }
}

impl Deref for CapturedUnit {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data()
    }
}

/**
    Reasons a sink refuses a unit.
*/
#[derive(Debug, Error)]
pub enum SinkError {
    /// The consumer is not keeping up.
    #[error("sink is full")]
    Full,
    /// The consumer went away.
    #[error("sink is closed")]
    Closed,
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}

/**
    Receives completed units from the capture thread.

    Called under a lock on the capture thread, so it must return promptly.
    A refused unit is dropped, which recycles its buffer.
*/
pub trait FrameSink: Send {
    fn deliver(&mut self, unit: CapturedUnit) -> Result<(), SinkError>;
}

impl<F> FrameSink for F
where
    F: FnMut(CapturedUnit) -> Result<(), SinkError> + Send,
{
    fn deliver(&mut self, unit: CapturedUnit) -> Result<(), SinkError> {
        self(unit)
    }
}

/**
    Hands units to a bounded channel without blocking.
*/
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: Sender<CapturedUnit>,
}

impl ChannelSink {
    /**
        Create a sink and the receiving end of its channel.

        At most `capacity` units wait in the channel; further units are
        refused with [`SinkError::Full`] until the consumer catches up.
    */
    pub fn bounded(capacity: usize) -> (Self, Receiver<CapturedUnit>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }
}

impl FrameSink for ChannelSink {
    fn deliver(&mut self, unit: CapturedUnit) -> Result<(), SinkError> {
        self.tx.try_send(unit).map_err(|e| match e {
            TrySendError::Full(_) => SinkError::Full,
            TrySendError::Disconnected(_) => SinkError::Closed,
        })
    }
}

static_assertions::assert_impl_all!(CapturedUnit: Send);
static_assertions::assert_impl_all!(ChannelSink: Send, FrameSink);
