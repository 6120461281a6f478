//! Event sequencer
//!
//! Reassembles the strictly ordered event stream from frames that may arrive
//! out of order or twice. Every buffered key is above the watermark.

use std::collections::BTreeMap;

/// What happened to an admitted frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission<T> {
    /// At or below the watermark, or already buffered
    Duplicate,
    /// Held until the gap before it fills
    Buffered,
    /// Contiguous run released in sequence order
    Released(Vec<T>),
    /// Buffer full and the frame does not close the gap
    Overflow,
}

/// Reordering buffer with a delivery watermark
#[derive(Debug, Clone)]
pub struct Sequencer<T> {
    highest_delivered: u64,
    pending: BTreeMap<u64, T>,
    capacity: usize,
}

impl<T> Sequencer<T> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            highest_delivered: 0,
            pending: BTreeMap::new(),
            capacity,
        }
    }

    /// Highest sequence number released so far
    #[must_use]
    pub fn highest_delivered(&self) -> u64 {
        self.highest_delivered
    }

    /// Number of frames waiting for a gap to fill
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Admit one frame
    pub fn admit(&mut self, sequence: u64, item: T) -> Admission<T> {
        if sequence <= self.highest_delivered || self.pending.contains_key(&sequence) {
            return Admission::Duplicate;
        }

        let next = self.highest_delivered + 1;
        if sequence != next && self.pending.len() >= self.capacity {
            return Admission::Overflow;
        }

        self.pending.insert(sequence, item);

        let mut released = Vec::new();
        while let Some(item) = self.pending.remove(&(self.highest_delivered + 1)) {
            self.highest_delivered += 1;
            released.push(item);
        }

        if released.is_empty() {
            Admission::Buffered
        } else {
            Admission::Released(released)
        }
    }

    /// Drop the buffer and rewind the watermark to zero
    pub fn reset(&mut self) {
        self.highest_delivered = 0;
        self.pending.clear();
    }
}
