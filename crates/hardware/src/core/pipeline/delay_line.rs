//! Fixed-length shift registers.
//!
//! A delay line holds one slot per tick of delay. Each call to [`DelayLine::shift`]
//! is one clock edge: the value written `len` shifts ago falls out, and the new
//! value takes its slot. The slots are allocated once; nothing grows per tick.
//!
//! The same structure backs both alignment delay lines (operands bypassing
//! stages) and the output registers of functional units.

/// A fixed-length shift register of optional values.
///
/// `None` slots are bubbles (ticks on which nothing was admitted).
#[derive(Clone, Debug)]
pub struct DelayLine<T> {
    slots: Box<[Option<T>]>,
    /// Slot holding the oldest value; written by the next shift.
    head: usize,
}

impl<T> DelayLine<T> {
    /// Creates a delay line of `len` ticks, initially full of bubbles.
    ///
    /// A zero-length line passes values through unchanged.
    pub fn new(len: usize) -> Self {
        let slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(len).collect();
        Self {
            slots: slots.into_boxed_slice(),
            head: 0,
        }
    }

    /// Returns the delay in ticks.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true for a pass-through line.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Advances the line by one tick.
    ///
    /// Returns the value written exactly `len()` shifts ago.
    #[inline]
    pub fn shift(&mut self, input: Option<T>) -> Option<T> {
        if self.slots.is_empty() {
            return input;
        }
        let out = std::mem::replace(&mut self.slots[self.head], input);
        self.head = (self.head + 1) % self.slots.len();
        out
    }

    /// Returns the value the next [`shift`](Self::shift) will emit.
    ///
    /// Always `None` for a pass-through line, whose output depends on the
    /// next input.
    #[inline]
    pub fn peek_out(&self) -> Option<&T> {
        self.slots.get(self.head).and_then(Option::as_ref)
    }

    /// Returns the number of non-bubble slots.
    pub fn occupancy(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Replaces every slot with a bubble.
    pub fn flush(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
    }
}
