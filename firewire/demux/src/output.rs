use crate::DemuxError;

/**
    A fixed-capacity destination buffer.

    Demuxers only ever append to it. The capacity is set when the buffer
    is allocated and never grows, so a pool of these has a predictable
    memory footprint.
*/
#[derive(Clone, Debug)]
pub struct OutputFrame {
    data: Vec<u8>,
    capacity: usize,
    complete: bool,
}

impl OutputFrame {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            capacity,
            complete: false,
        }
    }

    /// Bytes written so far (the write cursor).
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes that can still be appended.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.data.len()
    }

    /**
        Whether the demuxer finished the unit held in this buffer.
    */
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /**
        Append `bytes` at the write cursor and return the copy, so that
        fix-ups can be applied to the output without touching the input.
    */
    pub fn append(&mut self, bytes: &[u8]) -> Result<&mut [u8], DemuxError> {
        if bytes.len() > self.remaining() {
            return Err(DemuxError::DestinationTooSmall {
                needed: self.data.len() + bytes.len(),
                capacity: self.capacity,
            });
        }
        let start = self.data.len();
        self.data.extend_from_slice(bytes);
        Ok(&mut self.data[start..])
    }

    /**
        Reset the cursor and completion flag for reuse.
    */
    pub fn clear(&mut self) {
        self.data.clear();
        self.complete = false;
    }
}

impl AsRef<[u8]> for OutputFrame {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}
