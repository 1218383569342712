//! Drain Buffer for completed results.
//!
//! Results leave the final stage whether or not the consumer is ready. The
//! drain buffer holds them until retrieval and provides:
//! 1. **Append:** Write the final stage's output at the tail on the tick it becomes valid.
//! 2. **Peek:** Expose the head as the "result available" signal.
//! 3. **Retire:** Remove the head and release its credit through the admission controller.
//!
//! The buffer never needs to refuse a write: the admission controller counts
//! buffered results against the same capacity, so a full buffer implies an
//! empty pipeline.

use crate::common::error::PipelineError;
use crate::common::record::OutputRecord;
use crate::core::pipeline::admission::AdmissionController;

/// Fixed-capacity FIFO of completed results.
#[derive(Clone, Debug)]
pub struct DrainBuffer {
    entries: Box<[Option<OutputRecord>]>,
    /// Index of the oldest entry.
    head: usize,
    /// Index where the next entry will be written.
    tail: usize,
    /// Number of valid entries.
    count: usize,
}

impl DrainBuffer {
    /// Creates a drain buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: vec![None; capacity].into_boxed_slice(),
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Returns the capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of buffered results.
    #[inline]
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Returns true if no result is waiting.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if the buffer is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.entries.len()
    }

    /// Returns the oldest result without removing it.
    #[inline]
    pub fn front(&self) -> Option<&OutputRecord> {
        if self.count == 0 {
            return None;
        }
        self.entries[self.head].as_ref()
    }

    /// Appends a completed result at the tail.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DrainOverflow`] if the buffer is full; this
    /// means the admission capacity was sized wrongly.
    pub fn push(&mut self, record: OutputRecord) -> Result<(), PipelineError> {
        if self.is_full() {
            return Err(PipelineError::DrainOverflow {
                capacity: self.entries.len(),
            });
        }
        self.entries[self.tail] = Some(record);
        self.tail = (self.tail + 1) % self.entries.len();
        self.count += 1;
        Ok(())
    }

    /// Removes the oldest result and releases its in-flight credit.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DrainUnderflow`] if the buffer is empty, or the
    /// controller's error if the credit cannot be released.
    pub fn pop(&mut self, credits: &mut AdmissionController) -> Result<OutputRecord, PipelineError> {
        if self.count == 0 {
            return Err(PipelineError::DrainUnderflow);
        }
        credits.retire()?;
        let record = self.entries[self.head]
            .take()
            .ok_or(PipelineError::DrainUnderflow)?;
        self.head = (self.head + 1) % self.entries.len();
        self.count -= 1;
        Ok(record)
    }

    /// Discards every buffered result without touching any credit.
    pub fn flush_all(&mut self) {
        self.entries.fill(None);
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }
}
