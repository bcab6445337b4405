//! Snapshots of filter state.
//!
//! A snapshot carries everything needed to answer lookups exactly like the filter it was taken
//! from: the layout, the hash function tag and every bucket word. The eviction rng is not part
//! of it; a restored filter reseeds.

use crate::bitfield::{PackedLayout, PackedWord};
use crate::bucket::Bucket;
use crate::{CuckooFilter, Error, FieldLayout, HashFunction, Result};
use bincode::{Decode, Encode};
use core::convert::TryFrom;
use core::mem::size_of;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Format version written by this release.
const SNAPSHOT_VERSION: u8 = 1;

/// Serializable state of a [`CuckooFilter`].
///
/// ```
/// use cuckoof::CuckooFilter;
///
/// let mut filter = CuckooFilter::new(64).unwrap();
/// filter.insert("persisted").unwrap();
///
/// let bytes = filter.to_bytes().unwrap();
/// let restored = CuckooFilter::from_bytes(&bytes).unwrap();
/// assert!(restored.lookup("persisted").unwrap());
/// assert_eq!(restored.len(), 1);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct FilterSnapshot {
    /// Format version.
    pub version: u8,
    /// Slot layout of every bucket.
    pub layout: FieldLayout,
    /// Number of buckets.
    pub num_buckets: u64,
    /// Maximum number of displacements per insertion.
    pub max_kicks: u64,
    /// Tag of the keyed hash function, see [`HashFunction::tag`].
    pub hash_function: u8,
    /// Number of occupied slots.
    pub count: u64,
    /// Every bucket word, little-endian, in bucket order.
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    pub words: Vec<u8>,
}

fn invalid(msg: impl Into<String>) -> Error {
    Error::Persistence(msg.into())
}

impl CuckooFilter {
    /// Captures the state of the filter.
    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            version: SNAPSHOT_VERSION,
            layout: self.layout(),
            num_buckets: self.num_buckets() as u64,
            max_kicks: self.max_kicks() as u64,
            hash_function: self.hash_function().tag(),
            count: self.len() as u64,
            words: self
                .buckets()
                .iter()
                .flat_map(|b| b.word().to_le_bytes())
                .collect(),
        }
    }

    /// Restores a filter from a snapshot. The eviction rng is seeded from the OS.
    pub fn from_snapshot(snapshot: FilterSnapshot) -> Result<Self> {
        Self::restore(snapshot, None)
    }

    /// Restores a filter from a snapshot with a seeded eviction rng.
    pub fn from_snapshot_with_seed(snapshot: FilterSnapshot, seed: u64) -> Result<Self> {
        Self::restore(snapshot, Some(seed))
    }

    fn restore(snapshot: FilterSnapshot, seed: Option<u64>) -> Result<Self> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(invalid(format!("unknown version {}", snapshot.version)));
        }
        let packing = PackedLayout::new(snapshot.layout)?;
        let hash_function = HashFunction::try_from(snapshot.hash_function)?;
        let num_buckets = usize::try_from(snapshot.num_buckets)
            .map_err(|_| invalid(format!("{} buckets do not fit in memory", snapshot.num_buckets)))?;
        let max_kicks = usize::try_from(snapshot.max_kicks)
            .map_err(|_| invalid(format!("max_kicks {} is too large", snapshot.max_kicks)))?;

        let expected_len = num_buckets.checked_mul(size_of::<PackedWord>());
        if expected_len != Some(snapshot.words.len()) {
            return Err(invalid(format!(
                "{} bytes of bucket words for {} buckets",
                snapshot.words.len(),
                num_buckets
            )));
        }

        let buckets = snapshot
            .words
            .chunks_exact(size_of::<PackedWord>())
            .enumerate()
            .map(|(index, chunk)| {
                let mut word = [0u8; size_of::<PackedWord>()];
                word.copy_from_slice(chunk);
                let word = PackedWord::from_le_bytes(word);
                if packing.is_valid_word(word) {
                    Ok(Bucket::from_word(word))
                } else {
                    Err(invalid(format!("bucket {} holds stray bits {:#018x}", index, word)))
                }
            })
            .collect::<Result<Box<[Bucket]>>>()?;

        let mut builder = Self::builder()
            .num_buckets(num_buckets)
            .layout(snapshot.layout)
            .max_kicks(max_kicks)
            .hash_function(hash_function);
        if let Some(seed) = seed {
            builder = builder.seed(seed);
        }
        let count = usize::try_from(snapshot.count)
            .map_err(|_| invalid(format!("count {} is too large", snapshot.count)))?;
        let filter = Self::from_parts(builder.build_config()?, buckets, count)?;

        let occupied = filter.scan_occupied();
        if occupied != count {
            return Err(invalid(format!(
                "count is {} but {} slots are in use",
                count, occupied
            )));
        }
        debug!(num_buckets, count, "restored cuckoo filter from snapshot");
        Ok(filter)
    }

    /// Encodes the filter's snapshot with bincode's standard configuration.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::encode_to_vec(self.snapshot(), bincode::config::standard())
            .map_err(|e| invalid(e.to_string()))
    }

    /// Decodes and restores a filter encoded by [`to_bytes`](Self::to_bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let (snapshot, read): (FilterSnapshot, usize) =
            bincode::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| invalid(e.to_string()))?;
        if read != bytes.len() {
            return Err(invalid(format!("{} trailing bytes", bytes.len() - read)));
        }
        Self::from_snapshot(snapshot)
    }
}
