use std::collections::VecDeque;
use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use firewire_types::{ChannelGeometry, ChannelSelect, Error, Result};

use crate::IsoDevice;

/**
    One scripted outcome of [`MemoryDevice::read`].
*/
#[derive(Clone, Debug)]
pub enum ScriptedRead {
    /// Return these bytes.
    Data(Vec<u8>),
    /// Fail with an I/O error of this kind.
    Error(io::ErrorKind),
}

#[derive(Default)]
struct State {
    script: VecDeque<ScriptedRead>,
    configurations: Vec<ChannelGeometry>,
    select: Option<ChannelSelect>,
    fail_configuration: bool,
    reads: usize,
}

/**
    A device that replays scripted reads from memory.

    Once the script is exhausted every read returns zero bytes (end of
    stream). The paired [`MemoryDeviceHandle`] stays with the caller so
    reads can be queued and configuration inspected after the device has
    moved into a capture thread.
*/
pub struct MemoryDevice {
    state: Arc<Mutex<State>>,
}

/**
    Control side of a [`MemoryDevice`].
*/
#[derive(Clone)]
pub struct MemoryDeviceHandle {
    state: Arc<Mutex<State>>,
}

impl MemoryDevice {
    pub fn new() -> (Self, MemoryDeviceHandle) {
        let state = Arc::new(Mutex::new(State::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            MemoryDeviceHandle { state },
        )
    }

    /**
        Create a device whose script is the given raw buffers, in order.
    */
    pub fn with_reads(reads: impl IntoIterator<Item = Vec<u8>>) -> (Self, MemoryDeviceHandle) {
        let (device, handle) = Self::new();
        for data in reads {
            handle.push_read(data);
        }
        (device, handle)
    }
}

impl MemoryDeviceHandle {
    pub fn push_read(&self, data: Vec<u8>) {
        self.state.lock().script.push_back(ScriptedRead::Data(data));
    }

    pub fn push_error(&self, kind: io::ErrorKind) {
        self.state.lock().script.push_back(ScriptedRead::Error(kind));
    }

    /**
        Make the next `configure` calls fail.
    */
    pub fn fail_configuration(&self, fail: bool) {
        self.state.lock().fail_configuration = fail;
    }

    /**
        Every geometry the device was programmed with, in order.
    */
    pub fn configurations(&self) -> Vec<ChannelGeometry> {
        self.state.lock().configurations.clone()
    }

    pub fn select(&self) -> Option<ChannelSelect> {
        self.state.lock().select
    }

    /// Reads served so far, including failed ones.
    pub fn reads(&self) -> usize {
        self.state.lock().reads
    }

    /// Scripted reads not yet consumed.
    pub fn pending(&self) -> usize {
        self.state.lock().script.len()
    }
}

impl IsoDevice for MemoryDevice {
    fn configure(&mut self, geometry: &ChannelGeometry, select: ChannelSelect) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_configuration {
            return Err(Error::configuration("scripted configuration failure"));
        }
        state.configurations.push(*geometry);
        state.select = Some(select);
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut state = self.state.lock();
        let next = state.script.pop_front();
        if next.is_some() {
            state.reads += 1;
        }
        match next {
            None => Ok(0),
            Some(ScriptedRead::Error(kind)) => Err(io::Error::from(kind).into()),
            Some(ScriptedRead::Data(data)) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
        }
    }
}
