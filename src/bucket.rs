//! A fixed number of fingerprint slots sharing one packed word.

use crate::bitfield::{PackedLayout, PackedWord};
use crate::cuckoo::Fingerprint;
use rand::Rng;

/// One bucket of a cuckoo filter.
///
/// A bucket is nothing but its [`PackedWord`]; the slots are a view computed through a
/// [`PackedLayout`], which every method takes as an argument. Slots are scanned lowest index
/// first, so insertion order within a bucket is deterministic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct Bucket(PackedWord);

impl Bucket {
    /// Wraps a raw word. The caller is responsible for the word matching its layout.
    pub const fn from_word(word: PackedWord) -> Self {
        Self(word)
    }

    /// The raw packed word.
    pub const fn word(&self) -> PackedWord {
        self.0
    }

    fn find(&self, fingerprint: Fingerprint, layout: &PackedLayout) -> Option<usize> {
        (0..layout.slots()).find(|&slot| {
            layout.is_in_use(self.0, slot) && layout.get_fingerprint(self.0, slot) == fingerprint
        })
    }

    fn first_empty(&self, layout: &PackedLayout) -> Option<usize> {
        (0..layout.slots()).find(|&slot| !layout.is_in_use(self.0, slot))
    }

    /// Stores a fingerprint.
    ///
    /// With a counting layout a slot already holding `fingerprint` has its counter incremented
    /// instead, and the insertion fails if that counter is saturated. Otherwise the first empty
    /// slot takes the fingerprint. Returns `false` if nothing was stored.
    pub fn insert(&mut self, fingerprint: Fingerprint, layout: &PackedLayout) -> bool {
        if let Some(incremented) = self.increment(fingerprint, layout) {
            return incremented;
        }
        self.place(fingerprint, 1, layout)
    }

    /// Increments the counter of the slot holding `fingerprint`.
    ///
    /// Returns `None` when the layout has no counters or no slot matches, and `Some(false)` when
    /// the matching counter is already saturated.
    pub fn increment(&mut self, fingerprint: Fingerprint, layout: &PackedLayout) -> Option<bool> {
        if !layout.layout().is_counting() {
            return None;
        }
        let slot = self.find(fingerprint, layout)?;
        Some(layout.increment_counter(&mut self.0, slot))
    }

    /// Stores `fingerprint` with `counter` in the first empty slot, never merging with an
    /// existing entry. The counter is ignored by layouts without counters.
    pub fn place(&mut self, fingerprint: Fingerprint, counter: u64, layout: &PackedLayout) -> bool {
        match self.first_empty(layout) {
            Some(slot) => {
                layout.write_slot(&mut self.0, slot, fingerprint, counter);
                true
            }
            None => false,
        }
    }

    /// Whether any in-use slot holds `fingerprint`.
    pub fn contains(&self, fingerprint: Fingerprint, layout: &PackedLayout) -> bool {
        self.find(fingerprint, layout).is_some()
    }

    /// Multiplicity of `fingerprint`: the counter of its slot with a counting layout, otherwise
    /// the number of slots holding it. Zero when absent.
    pub fn count(&self, fingerprint: Fingerprint, layout: &PackedLayout) -> u64 {
        if layout.layout().is_counting() {
            return self
                .find(fingerprint, layout)
                .map_or(0, |slot| layout.get_counter(self.0, slot));
        }
        (0..layout.slots())
            .filter(|&slot| {
                layout.is_in_use(self.0, slot) && layout.get_fingerprint(self.0, slot) == fingerprint
            })
            .count() as u64
    }

    /// Clears the first slot holding `fingerprint`, whatever its counter.
    pub fn delete(&mut self, fingerprint: Fingerprint, layout: &PackedLayout) -> bool {
        match self.find(fingerprint, layout) {
            Some(slot) => {
                layout.clear_slot(&mut self.0, slot);
                true
            }
            None => false,
        }
    }

    /// Decrements the counter of the first slot holding `fingerprint`, clearing the slot once
    /// the counter reaches zero. Returns the remaining count, or `None` if nothing matched.
    ///
    /// Without counters this behaves like [`delete`](Self::delete).
    pub fn decrement(&mut self, fingerprint: Fingerprint, layout: &PackedLayout) -> Option<u64> {
        let slot = self.find(fingerprint, layout)?;
        let remaining = if layout.layout().is_counting() {
            layout.decrement_counter(&mut self.0, slot)
        } else {
            0
        };
        if remaining == 0 {
            layout.clear_slot(&mut self.0, slot);
        }
        Some(remaining)
    }

    /// Replaces a uniformly chosen occupied slot with `fingerprint` and `counter`, returning
    /// the evicted fingerprint and its counter.
    ///
    /// Only used to displace entries out of a full bucket; the bucket must hold at least one
    /// entry.
    pub fn swap_random_occupied<R: Rng + ?Sized>(
        &mut self,
        fingerprint: Fingerprint,
        counter: u64,
        layout: &PackedLayout,
        rng: &mut R,
    ) -> (Fingerprint, u64) {
        let occupied = self.occupied(layout);
        debug_assert!(occupied > 0, "cannot evict from an empty bucket");
        let nth = rng.gen_range(0..occupied.max(1));
        let slot = (0..layout.slots())
            .filter(|&slot| layout.is_in_use(self.0, slot))
            .nth(nth)
            .unwrap_or(0);
        let evicted = (
            layout.get_fingerprint(self.0, slot),
            layout.get_counter(self.0, slot),
        );
        layout.write_slot(&mut self.0, slot, fingerprint, counter);
        evicted
    }

    /// Number of in-use slots.
    pub fn occupied(&self, layout: &PackedLayout) -> usize {
        (0..layout.slots())
            .filter(|&slot| layout.is_in_use(self.0, slot))
            .count()
    }

    /// Whether every slot is in use.
    pub fn is_full(&self, layout: &PackedLayout) -> bool {
        self.occupied(layout) == layout.slots()
    }

    /// Whether no slot is in use.
    pub fn is_empty(&self, layout: &PackedLayout) -> bool {
        self.occupied(layout) == 0
    }
}
