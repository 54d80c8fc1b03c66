/*!
    Bounded pool of destination buffers.
*/

use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use firewire_demux::OutputFrame;
use firewire_types::{BufferGeometry, Error, Result};

struct PoolInner {
    free: Mutex<Vec<OutputFrame>>,
    returned: Condvar,
    geometry: BufferGeometry,
}

/**
    A fixed set of destination buffers shared between the capture thread
    and whoever consumes its output.

    All buffers are allocated up front. Acquiring waits at most the given
    timeout; buffers come back when the [`PooledFrame`] holding them is
    dropped, wherever that happens.
*/
#[derive(Clone)]
pub struct BufferPool {
    inner: Arc<PoolInner>,
}

impl BufferPool {
    pub fn new(geometry: BufferGeometry) -> Self {
        let free = (0..geometry.count)
            .map(|_| OutputFrame::with_capacity(geometry.size))
            .collect();
        Self {
            inner: Arc::new(PoolInner {
                free: Mutex::new(free),
                returned: Condvar::new(),
                geometry,
            }),
        }
    }

    /**
        Take a buffer, waiting up to `timeout` for one to be returned.
    */
    pub fn acquire(&self, timeout: Duration) -> Result<PooledFrame> {
        let mut free = self.inner.free.lock();
        if free.is_empty() {
            // Spurious wakeups just cut the wait short
            self.inner.returned.wait_for(&mut free, timeout);
        }
        let frame = free.pop().ok_or(Error::BufferTimeout)?;
        Ok(PooledFrame {
            frame: Some(frame),
            pool: Arc::clone(&self.inner),
        })
    }

    /// Buffers currently free.
    pub fn available(&self) -> usize {
        self.inner.free.lock().len()
    }

    pub fn geometry(&self) -> BufferGeometry {
        self.inner.geometry
    }
}

/**
    A destination buffer on loan from a [`BufferPool`].

    Dereferences to the [`OutputFrame`]. Dropping it clears the frame and
    returns it to the pool.
*/
pub struct PooledFrame {
    frame: Option<OutputFrame>,
    pool: Arc<PoolInner>,
}

impl Deref for PooledFrame {
    type Target = OutputFrame;

    fn deref(&self) -> &OutputFrame {
        match &self.frame {
            Some(frame) => frame,
            None => unreachable!("pooled frame is only vacated on drop"),
        }
    }
}

impl DerefMut for PooledFrame {
    fn deref_mut(&mut self) -> &mut OutputFrame {
        match &mut self.frame {
            Some(frame) => frame,
            None => unreachable!("pooled frame is only vacated on drop"),
        }
    }
}

impl Drop for PooledFrame {
    fn drop(&mut self) {
        if let Some(mut frame) = self.frame.take() {
            frame.clear();
            self.pool.free.lock().push(frame);
            self.pool.returned.notify_one();
        }
    }
}

impl std::fmt::Debug for PooledFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledFrame")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("complete", &self.is_complete())
            .finish()
    }
}

static_assertions::assert_impl_all!(BufferPool: Send, Sync);
static_assertions::assert_impl_all!(PooledFrame: Send);
