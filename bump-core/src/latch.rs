//! Collision Latch
//!
//! Hands a collision from the capture context over to the reactor.
//!
//! # Representation
//! The pending flag and the mask share a single atomic byte:
//! ```text
//!   bit 7     bits 6      bits 5..0
//!   PENDING   (unused)    SensorMask
//! ```
//! Latching is one store, consuming is one swap back to zero. Neither side can
//! ever observe a pending flag paired with a mask from another event, and a
//! consumed or released latch carries no stale mask.

use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::sensor::SensorMask;

const PENDING: u8 = 0x80;

/// Single-word pending flag plus sensor mask
///
/// Written by the capture handler only, consumed by the reactor only.
#[derive(Debug)]
pub struct CollisionLatch {
    word: AtomicU8,
}

impl CollisionLatch {
    /// Empty latch, nothing pending
    pub const fn new() -> Self {
        Self {
            word: AtomicU8::new(0),
        }
    }

    /// Marks a collision with `mask` as pending, replacing any unconsumed one
    pub fn latch(&self, mask: SensorMask) {
        self.word.store(PENDING | mask.bits(), Ordering::Release);
    }

    /// Drops any pending collision
    pub fn release(&self) {
        self.word.store(0, Ordering::Release);
    }

    /// Takes the pending collision, leaving the latch empty
    ///
    /// Returns `None` if nothing was pending.
    pub fn take(&self) -> Option<SensorMask> {
        let word = self.word.swap(0, Ordering::AcqRel);
        (word & PENDING != 0).then(|| SensorMask::from_bits(word))
    }

    /// True while a collision waits to be consumed
    pub fn is_pending(&self) -> bool {
        self.word.load(Ordering::Acquire) & PENDING != 0
    }
}

impl Default for CollisionLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Collision subsystem context
///
/// Holds the latch and the crash counter. The firmware keeps one of these in a
/// `static` and hands `&'static` references to the capture and reactor tasks.
#[derive(Debug, Default)]
pub struct CollisionMonitor {
    latch: CollisionLatch,
    crashes: AtomicU32,
}

impl CollisionMonitor {
    pub const fn new() -> Self {
        Self {
            latch: CollisionLatch::new(),
            crashes: AtomicU32::new(0),
        }
    }

    /// The latch shared by capture and reactor
    pub fn latch(&self) -> &CollisionLatch {
        &self.latch
    }

    /// Number of collisions handled so far
    pub fn crash_count(&self) -> u32 {
        self.crashes.load(Ordering::Relaxed)
    }

    /// Counts one handled collision and returns the new total
    pub fn record_crash(&self) -> u32 {
        self.crashes.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Clears the latch and the counter
    ///
    /// Meant for startup, before the capture context is running.
    pub fn reset(&self) {
        self.latch.release();
        self.crashes.store(0, Ordering::Relaxed);
    }
}
