use std::sync::atomic::{AtomicBool, Ordering};

/// Single-slot "extraction in progress" marker.
///
/// At most one [`SlotGuard`] exists per slot at a time; the slot frees itself when the guard
/// is dropped, including on early return.
#[derive(Debug, Default)]
pub struct ExtractionSlot {
    busy: AtomicBool,
}

impl ExtractionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot, or `None` if another extraction holds it
    pub fn try_acquire(&self) -> Option<SlotGuard<'_>> {
        self.busy.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed).ok()?;
        Some(SlotGuard { slot: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
pub struct SlotGuard<'a> {
    slot: &'a ExtractionSlot,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}
