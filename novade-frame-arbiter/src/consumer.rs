//! Consumer identities and the per-slot "already seen" set.

use std::fmt;

/// Opaque identity of a compositor-side consumer, typically one per output.
///
/// Only ever compared, never dereferenced, so the arbiter holds no reference to
/// the consumer and doesn't care about its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsumerId(u64);

impl ConsumerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Uses the address of `consumer` as its identity.
    ///
    /// The value must stay at the same address for as long as it acquires from the
    /// same arbiter.
    pub fn of<T: ?Sized>(consumer: &T) -> Self {
        Self(consumer as *const T as *const () as usize as u64)
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "consumer#{:x}", self.0)
    }
}

/// Which consumers have already been handed the current buffer.
///
/// The set only describes the current slot. Replacing the slot bumps the
/// generation and forgets everyone except the consumer that caused the
/// replacement, so the set never grows beyond the number of live outputs.
#[derive(Debug, Default)]
pub struct ConsumerRegistry {
    generation: u64,
    seen: Vec<ConsumerId>,
}

impl ConsumerRegistry {
    /// Creates an empty registry at generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `consumer` was handed the current buffer.
    pub fn has_seen(&self, consumer: ConsumerId) -> bool {
        self.seen.contains(&consumer)
    }

    /// Records that `consumer` was handed the current buffer. Idempotent.
    pub fn mark_seen(&mut self, consumer: ConsumerId) {
        if !self.has_seen(consumer) {
            self.seen.push(consumer);
        }
    }

    /// Starts a new slot. `advanced_by`, if any, is the only consumer that has
    /// seen the new current buffer.
    pub fn start_slot(&mut self, advanced_by: Option<ConsumerId>) {
        self.generation = self.generation.wrapping_add(1);
        self.seen.clear();
        self.seen.extend(advanced_by);
    }

    /// Number of slot replacements so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}
