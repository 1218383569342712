//! Record structures carried through the pipeline.
//!
//! 1. **Input Record:** The three scalar operands offered by the producer.
//! 2. **Lane:** A single scalar travelling between stages, tagged with its record's sequence number.
//! 3. **Output Record:** The final value handed to the consumer.

/// Number of scalar operands carried by every input record.
pub const RECORD_OPERANDS: usize = 3;

/// A record offered by the producer.
///
/// The arrival-order tag is not part of the record; it is assigned by the
/// admission controller when the record is accepted.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputRecord {
    /// Operands `a`, `b`, `c` in declaration order.
    pub operands: [f64; RECORD_OPERANDS],
}

impl InputRecord {
    /// Creates a record from its three operands.
    #[inline]
    pub const fn new(a: f64, b: f64, c: f64) -> Self {
        Self {
            operands: [a, b, c],
        }
    }

    /// Returns operand `index`, or `None` if records do not carry it.
    #[inline]
    pub fn operand(&self, index: usize) -> Option<f64> {
        self.operands.get(index).copied()
    }
}

/// One scalar in flight, tagged with the admission sequence number of its record.
///
/// Binary stages compare the tags of their two operands; a mismatch means a
/// delay line has the wrong length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lane {
    /// Admission sequence number of the owning record.
    pub seq: u64,
    /// Scalar payload.
    pub value: f64,
}

/// A completed result, linked 1:1 to its input record by admission order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutputRecord {
    /// Admission sequence number of the originating input record.
    pub seq: u64,
    /// Final computed value.
    pub value: f64,
}

impl From<Lane> for OutputRecord {
    fn from(lane: Lane) -> Self {
        Self {
            seq: lane.seq,
            value: lane.value,
        }
    }
}
