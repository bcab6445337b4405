//! Packs several fixed-width slots into one machine word.
//!
//! A [`FieldLayout`] declares how wide each sub-field of a slot is and how many slots share a
//! word. [`PackedLayout`] turns that declaration into shifts and masks once, and every read or
//! write of a slot goes through it. Slot `i` occupies bits `[i * w, (i + 1) * w)` of the word,
//! where `w` is the slot width; inside a slot the fingerprint sits in the low bits, followed by
//! the in-use flag and then the counter. This order is part of the persisted format.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "bincode")]
use bincode::{Decode, Encode};

/// The storage word of one bucket.
pub type PackedWord = u64;

/// Width of a [`PackedWord`] in bits.
pub const WORD_BITS: u32 = PackedWord::BITS;

/// Widest fingerprint a layout may declare. Fingerprints are carried around as `u32`.
pub const MAX_FINGERPRINT_BITS: u32 = u32::BITS;

#[inline]
const fn low_mask(width: u32) -> u64 {
    if width >= u64::BITS {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// Declarative description of one bucket's slots.
///
/// Every slot holds a fingerprint, an in-use flag and an optional counter. A layout is only
/// constructible if all of its slots fit into one [`PackedWord`]:
///
/// ```
/// use cuckoof::FieldLayout;
///
/// // 4 slots of 15-bit fingerprints plus an in-use bit use all 64 bits.
/// assert!(FieldLayout::new(15, 1, 0, 4).is_ok());
/// // One more fingerprint bit no longer fits.
/// assert!(FieldLayout::new(16, 1, 0, 4).is_err());
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "bincode", derive(Encode, Decode))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldLayout {
    fingerprint_bits: u32,
    in_use_bits: u32,
    counter_bits: u32,
    slots: u32,
}

impl FieldLayout {
    /// Validates and creates a layout.
    pub fn new(fingerprint_bits: u32, in_use_bits: u32, counter_bits: u32, slots: u32) -> Result<Self> {
        let layout = Self {
            fingerprint_bits,
            in_use_bits,
            counter_bits,
            slots,
        };
        layout.validate()?;
        Ok(layout)
    }

    /// A layout without counters and a single in-use bit per slot.
    pub fn plain(fingerprint_bits: u32, slots: u32) -> Result<Self> {
        Self::new(fingerprint_bits, 1, 0, slots)
    }

    /// A four-slot layout with a saturating counter of `counter_bits` per slot.
    pub fn counting(fingerprint_bits: u32, counter_bits: u32) -> Result<Self> {
        if counter_bits == 0 {
            return Err(Error::Configuration(
                "a counting layout needs at least one counter bit".into(),
            ));
        }
        Self::new(fingerprint_bits, 1, counter_bits, 4)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.slots == 0 {
            return Err(Error::Configuration("slots must be greater than zero".into()));
        }
        if self.fingerprint_bits == 0 || self.fingerprint_bits > MAX_FINGERPRINT_BITS {
            return Err(Error::Configuration(format!(
                "fingerprint_bits must be between 1 and {}, got {}",
                MAX_FINGERPRINT_BITS, self.fingerprint_bits
            )));
        }
        if self.in_use_bits == 0 {
            return Err(Error::Configuration("in_use_bits must be greater than zero".into()));
        }
        let slot_bits = self.fingerprint_bits as u64 + self.in_use_bits as u64 + self.counter_bits as u64;
        let total = slot_bits * self.slots as u64;
        if total > WORD_BITS as u64 {
            return Err(Error::Configuration(format!(
                "{} slots of {} bits need {} bits, but a bucket word has {}",
                self.slots, slot_bits, total, WORD_BITS
            )));
        }
        Ok(())
    }

    /// Bits per fingerprint.
    pub const fn fingerprint_bits(&self) -> u32 {
        self.fingerprint_bits
    }

    /// Bits of the in-use flag.
    pub const fn in_use_bits(&self) -> u32 {
        self.in_use_bits
    }

    /// Bits of the per-slot counter; zero for a layout without counters.
    pub const fn counter_bits(&self) -> u32 {
        self.counter_bits
    }

    /// Slots per bucket.
    pub const fn slots(&self) -> u32 {
        self.slots
    }

    /// Width of one slot in bits.
    pub const fn slot_bits(&self) -> u32 {
        self.fingerprint_bits + self.in_use_bits + self.counter_bits
    }

    /// Whether slots carry a counter.
    pub const fn is_counting(&self) -> bool {
        self.counter_bits > 0
    }
}

impl Default for FieldLayout {
    /// Four slots of a 15-bit fingerprint and an in-use bit, filling the word exactly.
    fn default() -> Self {
        Self {
            fingerprint_bits: 15,
            in_use_bits: 1,
            counter_bits: 0,
            slots: 4,
        }
    }
}

/// Shifts and masks derived from a [`FieldLayout`].
///
/// All accessors are pure functions of the word they are given. Writes touch exactly the bits
/// of the addressed field; the bits of every other field and slot are left as they were.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedLayout {
    layout: FieldLayout,
    slot_bits: u32,
    in_use_shift: u32,
    counter_shift: u32,
    fingerprint_mask: u64,
    in_use_mask: u64,
    counter_mask: u64,
    used_mask: u64,
}

impl PackedLayout {
    /// Computes the packing of `layout`, re-validating it.
    pub fn new(layout: FieldLayout) -> Result<Self> {
        layout.validate()?;
        let slot_bits = layout.slot_bits();
        Ok(Self {
            layout,
            slot_bits,
            in_use_shift: layout.fingerprint_bits,
            counter_shift: layout.fingerprint_bits + layout.in_use_bits,
            fingerprint_mask: low_mask(layout.fingerprint_bits),
            in_use_mask: low_mask(layout.in_use_bits),
            counter_mask: low_mask(layout.counter_bits),
            used_mask: low_mask(slot_bits * layout.slots),
        })
    }

    /// The layout this packing was derived from.
    pub const fn layout(&self) -> FieldLayout {
        self.layout
    }

    /// Slots per word.
    pub const fn slots(&self) -> usize {
        self.layout.slots as usize
    }

    /// Mask of a fingerprint value.
    pub const fn fingerprint_mask(&self) -> u32 {
        self.fingerprint_mask as u32
    }

    /// Largest value a counter can hold; zero without counters.
    pub const fn counter_max(&self) -> u64 {
        self.counter_mask
    }

    /// Bits of the word covered by some slot. Every other bit stays zero.
    pub const fn used_mask(&self) -> u64 {
        self.used_mask
    }

    #[inline]
    fn base(&self, slot: usize) -> u32 {
        debug_assert!(slot < self.slots(), "slot {} out of {}", slot, self.slots());
        slot as u32 * self.slot_bits
    }

    #[inline]
    fn read(word: PackedWord, shift: u32, mask: u64) -> u64 {
        if mask == 0 {
            return 0;
        }
        (word >> shift) & mask
    }

    #[inline]
    fn write(word: &mut PackedWord, shift: u32, mask: u64, value: u64) {
        if mask == 0 {
            return;
        }
        *word = (*word & !(mask << shift)) | ((value & mask) << shift);
    }

    /// Reads the fingerprint of `slot`.
    #[inline]
    pub fn get_fingerprint(&self, word: PackedWord, slot: usize) -> u32 {
        Self::read(word, self.base(slot), self.fingerprint_mask) as u32
    }

    /// Writes the fingerprint of `slot`, truncating `value` to the fingerprint width.
    #[inline]
    pub fn set_fingerprint(&self, word: &mut PackedWord, slot: usize, value: u32) {
        Self::write(word, self.base(slot), self.fingerprint_mask, value as u64);
    }

    /// Whether `slot` holds an entry.
    #[inline]
    pub fn is_in_use(&self, word: PackedWord, slot: usize) -> bool {
        Self::read(word, self.base(slot) + self.in_use_shift, self.in_use_mask) != 0
    }

    /// Sets or clears every bit of the in-use flag of `slot`.
    #[inline]
    pub fn set_in_use(&self, word: &mut PackedWord, slot: usize, in_use: bool) {
        let value = if in_use { self.in_use_mask } else { 0 };
        Self::write(word, self.base(slot) + self.in_use_shift, self.in_use_mask, value);
    }

    /// Reads the counter of `slot`.
    #[inline]
    pub fn get_counter(&self, word: PackedWord, slot: usize) -> u64 {
        Self::read(word, self.base(slot) + self.counter_shift, self.counter_mask)
    }

    /// Writes the counter of `slot`, truncating `value` to the counter width.
    #[inline]
    pub fn set_counter(&self, word: &mut PackedWord, slot: usize, value: u64) {
        Self::write(word, self.base(slot) + self.counter_shift, self.counter_mask, value);
    }

    /// Adds one to the counter of `slot`.
    ///
    /// Saturates: a counter already at [`counter_max`](Self::counter_max) is left untouched and
    /// `false` is returned. It never wraps around to zero.
    #[inline]
    pub fn increment_counter(&self, word: &mut PackedWord, slot: usize) -> bool {
        let current = self.get_counter(*word, slot);
        if current >= self.counter_mask {
            return false;
        }
        self.set_counter(word, slot, current + 1);
        true
    }

    /// Subtracts one from the counter of `slot`, stopping at zero, and returns the new value.
    #[inline]
    pub fn decrement_counter(&self, word: &mut PackedWord, slot: usize) -> u64 {
        let value = self.get_counter(*word, slot).saturating_sub(1);
        self.set_counter(word, slot, value);
        value
    }

    /// Zeroes every bit of `slot` in a single write.
    #[inline]
    pub fn clear_slot(&self, word: &mut PackedWord, slot: usize) {
        Self::write(word, self.base(slot), low_mask(self.slot_bits), 0);
    }

    /// Replaces the whole of `slot` with an in-use entry in a single write.
    #[inline]
    pub fn write_slot(&self, word: &mut PackedWord, slot: usize, fingerprint: u32, counter: u64) {
        let value = (fingerprint as u64 & self.fingerprint_mask)
            | (self.in_use_mask << self.in_use_shift)
            | (counter & self.counter_mask)
                .checked_shl(self.counter_shift)
                .unwrap_or(0);
        Self::write(word, self.base(slot), low_mask(self.slot_bits), value);
    }

    /// Checks that a word only uses bits of this layout and that empty slots are zeroed.
    pub fn is_valid_word(&self, word: PackedWord) -> bool {
        if word & !self.used_mask != 0 {
            return false;
        }
        (0..self.slots()).all(|slot| {
            self.is_in_use(word, slot)
                || Self::read(word, self.base(slot), low_mask(self.slot_bits)) == 0
        })
    }
}
