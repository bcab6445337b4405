//! Implements a cuckoo filter as described in [Cuckoo Filter: Practically Better Than Bloom].
//!
//! [Cuckoo Filter: Practically Better Than Bloom]: https://www.cs.cmu.edu/~dga/papers/cuckoo-conext2014.pdf

use crate::bitfield::{FieldLayout, PackedLayout};
use crate::bucket::Bucket;
use crate::hash::{mix, mix64, HashFunction, KeyHasher};
use crate::{Error, Filter, Key, Result};
use derive_builder::Builder;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, trace};

/// A fingerprint, truncated to the layout's fingerprint width.
pub type Fingerprint = u32;

/// Displacements attempted before an insertion gives up.
pub const DEFAULT_MAX_KICKS: usize = 500;

/// Seed under which keys are hashed.
const KEY_SEED: u32 = 0;

/// Seed of the fingerprint hash that derives alternate buckets. Any constant works as long as it
/// never changes, since persisted filters depend on it. This one is MurmurHash2's multiplier.
const ALT_INDEX_SEED: u64 = 0x5bd1_e995;

/// Load a filter sized by [`CuckooFilter::with_expected_items`] is expected to reach.
const TARGET_LOAD_FACTOR: f64 = 0.95;

/// Construction parameters of a [`CuckooFilter`].
///
/// Usually built through [`CuckooFilter::builder`]:
///
/// ```
/// use cuckoof::{CuckooFilter, FieldLayout, HashFunction};
///
/// let filter = CuckooFilter::builder()
///     .num_buckets(2048)
///     .layout(FieldLayout::plain(12, 4).unwrap())
///     .hash_function(HashFunction::XxHash)
///     .max_kicks(100)
///     .seed(42)
///     .build()
///     .unwrap();
/// assert_eq!(filter.capacity(), 8192);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(
    name = "CuckooFilterBuilder",
    pattern = "owned",
    build_fn(private, name = "base_build", validate = "Self::validate")
)]
pub struct FilterConfig {
    /// Number of buckets. Power-of-two counts use the classic xor for alternate buckets.
    #[builder(default = "1024")]
    num_buckets: usize,

    /// Slot layout of every bucket.
    #[builder(default)]
    layout: FieldLayout,

    /// Maximum number of displacements per insertion.
    #[builder(default = "DEFAULT_MAX_KICKS")]
    max_kicks: usize,

    /// Keyed hash used on keys.
    #[builder(default)]
    hash_function: HashFunction,

    /// Seed of the eviction rng. Unseeded filters draw from the OS.
    #[builder(default, setter(strip_option))]
    seed: Option<u64>,
}

impl FilterConfig {
    /// Number of buckets.
    pub const fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    /// Slot layout of every bucket.
    pub const fn layout(&self) -> FieldLayout {
        self.layout
    }

    /// Maximum number of displacements per insertion.
    pub const fn max_kicks(&self) -> usize {
        self.max_kicks
    }

    /// Keyed hash used on keys.
    pub const fn hash_function(&self) -> HashFunction {
        self.hash_function
    }

    /// Seed of the eviction rng, if any.
    pub const fn seed(&self) -> Option<u64> {
        self.seed
    }
}

impl CuckooFilterBuilder {
    fn validate(&self) -> core::result::Result<(), String> {
        if let Some(num_buckets) = self.num_buckets {
            if num_buckets == 0 {
                return Err("num_buckets must be greater than zero".into());
            }
            if num_buckets > u32::MAX as usize {
                return Err(format!("num_buckets must be at most {}", u32::MAX));
            }
        }
        if self.max_kicks == Some(0) {
            return Err("max_kicks must be greater than zero".into());
        }
        if let Some(layout) = &self.layout {
            layout.validate().map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Validates the configuration without allocating a filter.
    pub fn build_config(self) -> Result<FilterConfig> {
        Ok(self.base_build()?)
    }

    /// Builds a [`CuckooFilter`] with the specified configuration.
    pub fn build(self) -> Result<CuckooFilter> {
        CuckooFilter::from_config(self.build_config()?)
    }
}

impl From<CuckooFilterBuilderError> for Error {
    fn from(e: CuckooFilterBuilderError) -> Self {
        Error::Configuration(e.to_string())
    }
}

/// Cuckoo filter over bit-packed buckets.
///
/// Each key maps to a fingerprint and two candidate buckets. The first bucket comes from the
/// key's hash; the second is derived from the first and the fingerprint alone, so an entry can
/// be moved to its other bucket without knowing its key. When both buckets are full, an entry is
/// evicted at random and moved to its other bucket, possibly evicting another, up to
/// `max_kicks` times.
///
/// With the default layout (four slots of 15-bit fingerprints) the false positive rate is
/// <0.025%, and insertions keep succeeding up to a load factor of about 95%.
///
/// ```
/// use cuckoof::CuckooFilter;
///
/// const SAMPLE_SIZE: u64 = 100_000;
/// let mut filter = CuckooFilter::with_expected_items(SAMPLE_SIZE as usize).unwrap();
///
/// for key in 0..SAMPLE_SIZE {
///     assert!(filter.insert(key).unwrap());
/// }
///
/// // no false negatives
/// for key in 0..SAMPLE_SIZE {
///     assert!(filter.lookup(key).unwrap());
/// }
///
/// // false positive rate
/// let false_positives = (SAMPLE_SIZE..2 * SAMPLE_SIZE)
///     .filter(|key| filter.lookup(*key).unwrap())
///     .count();
/// let fp_rate: f64 = (false_positives * 100) as f64 / SAMPLE_SIZE as f64;
/// assert!(fp_rate < 0.05, "False positive rate is {}", fp_rate);
/// ```
///
/// Filters are not synchronized. Mutation takes `&mut self`, so sharing one across threads needs
/// an outer lock.
#[derive(Debug, Clone)]
pub struct CuckooFilter {
    buckets: Box<[Bucket]>,
    packing: PackedLayout,
    count: usize,
    max_kicks: usize,
    hash_function: HashFunction,
    rng: StdRng,
}

impl CuckooFilter {
    /// Creates a builder with the default configuration.
    pub fn builder() -> CuckooFilterBuilder {
        CuckooFilterBuilder::default()
    }

    /// Creates a filter of `num_buckets` buckets with the default layout.
    pub fn new(num_buckets: usize) -> Result<Self> {
        Self::builder().num_buckets(num_buckets).build()
    }

    /// Creates a filter with the default layout, sized so that `items` keys reach about 95% load.
    ///
    /// The bucket count is rounded up to a power of two.
    pub fn with_expected_items(items: usize) -> Result<Self> {
        let slots = FieldLayout::default().slots() as f64;
        let num_buckets = ((items as f64) / (slots * TARGET_LOAD_FACTOR)).ceil() as usize;
        Self::new(num_buckets.max(1).next_power_of_two())
    }

    /// Creates an empty filter from a validated configuration.
    pub fn from_config(config: FilterConfig) -> Result<Self> {
        let buckets = vec![Bucket::default(); config.num_buckets].into_boxed_slice();
        Self::from_parts(config, buckets, 0)
    }

    pub(crate) fn from_parts(config: FilterConfig, buckets: Box<[Bucket]>, count: usize) -> Result<Self> {
        if buckets.is_empty() {
            return Err(Error::Configuration("num_buckets must be greater than zero".into()));
        }
        let packing = PackedLayout::new(config.layout)?;
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

        debug!(
            num_buckets = buckets.len(),
            slots = config.layout.slots(),
            fingerprint_bits = config.layout.fingerprint_bits(),
            counter_bits = config.layout.counter_bits(),
            hash_function = ?config.hash_function,
            count,
            "created cuckoo filter"
        );

        Ok(Self {
            buckets,
            packing,
            count,
            max_kicks: config.max_kicks,
            hash_function: config.hash_function,
            rng,
        })
    }

    /// Derives the fingerprint of a key hash: the hash is avalanched and truncated to the
    /// fingerprint width.
    #[inline]
    pub fn fingerprint(&self, hash: u64) -> Fingerprint {
        (mix64(hash) as u32) & self.packing.fingerprint_mask()
    }

    /// Bucket a key hash maps to first.
    #[inline]
    pub fn primary_index(&self, hash: u64) -> usize {
        (hash % self.buckets.len() as u64) as usize
    }

    /// The other bucket of a fingerprint stored at `index`.
    ///
    /// Depends only on `index` and the fingerprint, and is its own inverse:
    /// `alternate_index(alternate_index(i, fp), fp) == i`.
    ///
    /// With a power-of-two bucket count the fingerprint's hash is xor-ed into the index.
    /// Xor-then-modulo would not be an involution for other counts, so those reflect the index
    /// around the fingerprint's hash instead.
    #[inline]
    pub fn alternate_index(&self, index: usize, fingerprint: Fingerprint) -> usize {
        let n = self.buckets.len();
        let hash = mix(fingerprint as u64, ALT_INDEX_SEED);
        if n.is_power_of_two() {
            index ^ (hash as usize & (n - 1))
        } else {
            let hash = (hash % n as u64) as usize;
            (hash + n - index) % n
        }
    }

    /// Computes the fingerprint and both candidate buckets of a key.
    fn locate(&self, key: Key<'_>) -> Result<(usize, usize, Fingerprint)> {
        let hash = self.hash_function.hash(&key.to_bytes(), KEY_SEED)?;
        let fingerprint = self.fingerprint(hash);
        let index = self.primary_index(hash);
        Ok((index, self.alternate_index(index, fingerprint), fingerprint))
    }

    /// Adds a key to the filter.
    ///
    /// Returns `Ok(false)` when no room could be made within `max_kicks` displacements. In that
    /// case the last displaced entry was dropped, which may be the key's own or one stored
    /// before it, and lookups of the key it belonged to may now miss. A full filter is expected;
    /// rebuild a larger one.
    ///
    /// With a counting layout, inserting a key whose fingerprint is already stored increments
    /// its counter, and fails without side effects once the counter is saturated.
    pub fn insert<'a, K: Into<Key<'a>>>(&mut self, key: K) -> Result<bool> {
        let (i1, i2, fingerprint) = self.locate(key.into())?;

        if self.packing.layout().is_counting() {
            for index in [i1, i2] {
                if let Some(incremented) = self.buckets[index].increment(fingerprint, &self.packing) {
                    return Ok(incremented);
                }
            }
        }

        for index in [i1, i2] {
            if self.buckets[index].place(fingerprint, 1, &self.packing) {
                self.count += 1;
                return Ok(true);
            }
        }

        Ok(self.displace(i1, fingerprint))
    }

    /// Moves entries out of the way until `fingerprint` has a slot, starting at bucket `index`.
    fn displace(&mut self, mut index: usize, fingerprint: Fingerprint) -> bool {
        let mut entry = (fingerprint, 1);
        for kick in 0..self.max_kicks {
            let (evicted, counter) =
                self.buckets[index].swap_random_occupied(entry.0, entry.1, &self.packing, &mut self.rng);
            index = self.alternate_index(index, evicted);
            trace!(kick, index, "relocating evicted fingerprint");

            if self.buckets[index].place(evicted, counter, &self.packing) {
                self.count += 1;
                return true;
            }
            entry = (evicted, counter);
        }

        debug!(
            max_kicks = self.max_kicks,
            dropped = entry.0,
            load_factor = self.load_factor(),
            "insertion exhausted its displacements"
        );
        false
    }

    /// Returns `true` if the filter probably contains the key.
    pub fn lookup<'a, K: Into<Key<'a>>>(&self, key: K) -> Result<bool> {
        let (i1, i2, fingerprint) = self.locate(key.into())?;
        Ok(self.buckets[i1].contains(fingerprint, &self.packing)
            || self.buckets[i2].contains(fingerprint, &self.packing))
    }

    /// Removes one entry matching the key, looking in its first bucket before its second.
    ///
    /// Only delete keys that were inserted and not deleted since. Fingerprints collide, so
    /// deleting any other key may remove the entry of a different key.
    pub fn delete<'a, K: Into<Key<'a>>>(&mut self, key: K) -> Result<bool> {
        let (i1, i2, fingerprint) = self.locate(key.into())?;
        for index in [i1, i2] {
            if self.buckets[index].delete(fingerprint, &self.packing) {
                self.count -= 1;
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// How many times the key is probably present.
    ///
    /// With a counting layout this is the counter of its entry; otherwise it counts the entries
    /// matching its fingerprint in both buckets. Collisions can only make it larger.
    pub fn count_of<'a, K: Into<Key<'a>>>(&self, key: K) -> Result<u64> {
        let (i1, i2, fingerprint) = self.locate(key.into())?;
        let first = self.buckets[i1].count(fingerprint, &self.packing);
        if i1 == i2 || (first > 0 && self.packing.layout().is_counting()) {
            return Ok(first);
        }
        Ok(first + self.buckets[i2].count(fingerprint, &self.packing))
    }

    /// Removes one occurrence of the key and returns how many remain, or `None` if the key was
    /// not found. The entry is freed once its count reaches zero.
    ///
    /// Without counters this is [`delete`](Self::delete). The same caveat applies: only
    /// decrement keys that were inserted.
    pub fn decrement<'a, K: Into<Key<'a>>>(&mut self, key: K) -> Result<Option<u64>> {
        let (i1, i2, fingerprint) = self.locate(key.into())?;
        for index in [i1, i2] {
            if let Some(remaining) = self.buckets[index].decrement(fingerprint, &self.packing) {
                if remaining == 0 {
                    self.count -= 1;
                }
                return Ok(Some(remaining));
            }
        }
        Ok(None)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(|b| *b = Bucket::default());
        self.count = 0;
    }

    /// Number of occupied slots.
    pub const fn len(&self) -> usize {
        self.count
    }

    /// Whether no slot is occupied.
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.buckets.len() * self.packing.slots()
    }

    /// Number of buckets.
    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Maximum number of displacements per insertion.
    pub const fn max_kicks(&self) -> usize {
        self.max_kicks
    }

    /// Slot layout of every bucket.
    pub const fn layout(&self) -> FieldLayout {
        self.packing.layout()
    }

    /// Keyed hash used on keys.
    pub const fn hash_function(&self) -> HashFunction {
        self.hash_function
    }

    /// Whether slots carry counters.
    pub const fn is_counting(&self) -> bool {
        self.packing.layout().is_counting()
    }

    /// The buckets, in index order.
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Fraction of slots in use.
    pub fn load_factor(&self) -> f64 {
        self.count as f64 / self.capacity() as f64
    }

    /// Estimated footprint in bytes: the filter itself plus one word per bucket.
    pub fn approximate_memory_size(&self) -> u64 {
        (core::mem::size_of::<Self>() + core::mem::size_of_val(&*self.buckets)) as u64
    }

    /// Theoretical false positive rate of a full filter, `1 - (1 - 2^-f)^(2b)`, for `f`-bit
    /// fingerprints and `b` slots per bucket.
    pub fn false_positive_rate(&self) -> f64 {
        let layout = self.packing.layout();
        let miss = 1.0 - 0.5f64.powi(layout.fingerprint_bits() as i32);
        1.0 - miss.powi(2 * layout.slots() as i32)
    }

    /// Counts in-use slots by scanning every bucket. Only used to verify `len`.
    pub(crate) fn scan_occupied(&self) -> usize {
        self.buckets
            .iter()
            .map(|b| b.occupied(&self.packing))
            .sum()
    }
}

impl<'a, K: Into<Key<'a>>> Filter<K> for CuckooFilter {
    fn insert(&mut self, key: K) -> Result<bool> {
        CuckooFilter::insert(self, key)
    }

    fn contains(&self, key: K) -> Result<bool> {
        self.lookup(key)
    }

    fn remove(&mut self, key: K) -> Result<bool> {
        self.delete(key)
    }

    fn len(&self) -> usize {
        self.count
    }

    fn load_factor(&self) -> f64 {
        CuckooFilter::load_factor(self)
    }
}

#[cfg(test)]
mod test {
    use super::{CuckooFilter, DEFAULT_MAX_KICKS};
    use crate::{Error, FieldLayout, Filter, HashFunction};
    use proptest::prelude::*;
    use rand::Rng;

    fn filter(num_buckets: usize, layout: FieldLayout) -> CuckooFilter {
        CuckooFilter::builder()
            .num_buckets(num_buckets)
            .layout(layout)
            .seed(0x5eed)
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let filter = CuckooFilter::builder().build().unwrap();
        assert_eq!(filter.num_buckets(), 1024);
        assert_eq!(filter.capacity(), 4096);
        assert_eq!(filter.max_kicks(), DEFAULT_MAX_KICKS);
        assert_eq!(filter.hash_function(), HashFunction::Murmur3);
        assert_eq!(filter.layout(), FieldLayout::default());
        assert!(filter.is_empty());
        assert!(!filter.is_counting());
    }

    #[test]
    fn test_builder_validation() {
        let result = CuckooFilter::builder().num_buckets(0).build();
        assert!(matches!(result, Err(Error::Configuration(ref m)) if m.contains("num_buckets")));
        assert!(CuckooFilter::new(0).is_err());
        let result = CuckooFilter::builder().max_kicks(0).build();
        assert!(matches!(result, Err(Error::Configuration(ref m)) if m.contains("max_kicks")));
    }

    #[test]
    fn test_with_expected_items() {
        let filter = CuckooFilter::with_expected_items(1000).unwrap();
        // 1000 / (4 * 0.95) = 263.2, rounded up to a power of two.
        assert_eq!(filter.num_buckets(), 512);
        assert_eq!(CuckooFilter::with_expected_items(0).unwrap().num_buckets(), 1);
    }

    #[test]
    fn test_fingerprint_fits_layout() {
        let filter = filter(64, FieldLayout::plain(8, 4).unwrap());
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            assert!(filter.fingerprint(rng.gen()) <= 0xff);
        }
    }

    #[test]
    fn test_indices_in_range() {
        let mut rng = rand::thread_rng();
        for num_buckets in [1, 3, 1000, 1024, 1031] {
            let filter = filter(num_buckets, FieldLayout::default());
            for _ in 0..1_000 {
                let hash: u64 = rng.gen();
                let i1 = filter.primary_index(hash);
                let i2 = filter.alternate_index(i1, filter.fingerprint(hash));
                assert!(i1 < num_buckets);
                assert!(i2 < num_buckets);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_alternate_index_is_involution(
            num_buckets in 1usize..5000,
            index in any::<usize>(),
            fingerprint in 0u32..(1 << 15),
        ) {
            let filter = filter(num_buckets, FieldLayout::default());
            let index = index % num_buckets;
            let alternate = filter.alternate_index(index, fingerprint);
            prop_assert!(alternate < num_buckets);
            prop_assert_eq!(filter.alternate_index(alternate, fingerprint), index);
        }
    }

    #[test]
    fn test_insert_lookup_delete() {
        let mut filter = filter(128, FieldLayout::default());
        assert!(!filter.lookup("duck").unwrap());
        assert!(filter.insert("duck").unwrap());
        assert!(filter.lookup("duck").unwrap());
        assert_eq!(filter.len(), 1);

        assert!(filter.delete("duck").unwrap());
        assert!(!filter.lookup("duck").unwrap());
        assert!(!filter.delete("duck").unwrap());
        assert!(filter.is_empty());
    }

    #[test]
    fn test_plain_duplicates_occupy_slots() {
        let mut filter = filter(128, FieldLayout::default());
        for expected in 1..=3 {
            assert!(filter.insert(5u32).unwrap());
            assert_eq!(filter.count_of(5u32).unwrap(), expected);
        }
        assert_eq!(filter.len(), 3);
        assert!(filter.delete(5u32).unwrap());
        assert!(filter.lookup(5u32).unwrap());
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_no_false_negatives() {
        const SAMPLE_SIZE: usize = 3_000;
        let mut filter = filter(1024, FieldLayout::default());
        let mut rng = rand::thread_rng();
        let keys: Vec<u64> = (0..SAMPLE_SIZE).map(|_| rng.gen()).collect();

        for key in &keys {
            assert!(filter.insert(*key).unwrap());
        }
        for key in &keys {
            assert!(filter.lookup(*key).unwrap());
        }
        assert_eq!(filter.len(), SAMPLE_SIZE);
        assert_eq!(filter.scan_occupied(), SAMPLE_SIZE);
    }

    #[test]
    fn test_count_matches_scan_after_failures() {
        let mut filter = filter(64, FieldLayout::plain(8, 4).unwrap());
        let mut failures = 0;
        for key in 0u64..1_000 {
            if !filter.insert(key).unwrap() {
                failures += 1;
            }
            assert_eq!(filter.len(), filter.scan_occupied());
        }
        assert!(failures > 0);
        assert!(filter.len() <= filter.capacity());
        for key in 0u64..1_000 {
            filter.delete(key).unwrap();
            assert_eq!(filter.len(), filter.scan_occupied());
        }
    }

    #[test]
    fn test_exhausted_kicks_drop_one_entry() {
        let mut filter = CuckooFilter::builder()
            .num_buckets(1)
            .layout(FieldLayout::plain(15, 2).unwrap())
            .max_kicks(3)
            .seed(3)
            .build()
            .unwrap();
        assert!(filter.insert(1u8).unwrap());
        assert!(filter.insert(2u8).unwrap());

        // The only bucket is its own alternate, so every kick fails.
        assert!(!filter.insert(3u8).unwrap());
        assert_eq!(filter.len(), 2);
        assert_eq!(filter.scan_occupied(), 2);
        let found = (1u8..=3).filter(|k| filter.lookup(*k).unwrap()).count();
        assert_eq!(found, 2);
    }

    #[test]
    fn test_load_factor_sustained() {
        let mut filter = filter(1024, FieldLayout::default());
        let capacity = filter.capacity();
        let attempts = (capacity as f64 * 0.95) as u64;
        let mut first_failure = None;
        let mut successes = 0;
        for key in 0..attempts {
            if filter.insert(key).unwrap() {
                successes += 1;
            } else if first_failure.is_none() {
                first_failure = Some(filter.load_factor());
            }
        }
        let success_rate = successes as f64 / attempts as f64;
        assert!(success_rate >= 0.95, "success rate is {}", success_rate);
        if let Some(load) = first_failure {
            assert!(load > 0.85, "first failure at load {}", load);
        }
    }

    #[test]
    fn test_displacement_is_reproducible() {
        let run = || {
            let mut filter = filter(256, FieldLayout::plain(10, 4).unwrap());
            let outcomes: Vec<bool> = (0u64..1_100).map(|k| filter.insert(k).unwrap()).collect();
            let words: Vec<u64> = filter.buckets().iter().map(|b| b.word()).collect();
            (outcomes, words)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_non_power_of_two_buckets() {
        const SAMPLE_SIZE: u64 = 3_200;
        let mut filter = filter(1000, FieldLayout::default());
        for key in 0..SAMPLE_SIZE {
            assert!(filter.insert(key).unwrap(), "failed at {}", key);
        }
        for key in 0..SAMPLE_SIZE {
            assert!(filter.lookup(key).unwrap());
        }
    }

    #[test]
    fn test_counting_layout() {
        let mut filter = filter(128, FieldLayout::counting(12, 3).unwrap());
        assert!(filter.is_counting());
        for expected in 1..=7 {
            assert!(filter.insert("dup").unwrap());
            assert_eq!(filter.count_of("dup").unwrap(), expected);
        }
        assert_eq!(filter.len(), 1);

        // Saturated: the eighth insertion fails and the counter stays put.
        assert!(!filter.insert("dup").unwrap());
        assert_eq!(filter.count_of("dup").unwrap(), 7);

        assert_eq!(filter.decrement("dup").unwrap(), Some(6));
        assert_eq!(filter.len(), 1);
        assert!(filter.delete("dup").unwrap());
        assert_eq!(filter.count_of("dup").unwrap(), 0);
        assert_eq!(filter.decrement("dup").unwrap(), None);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_counting_displacement_keeps_counters() {
        let mut filter = filter(64, FieldLayout::counting(10, 4).unwrap());
        for key in 0u64..150 {
            assert!(filter.insert(key).unwrap());
            assert!(filter.insert(key).unwrap());
        }
        for key in 0u64..150 {
            assert!(filter.count_of(key).unwrap() >= 2);
        }
        assert_eq!(filter.len(), filter.scan_occupied());
    }

    #[test]
    fn test_every_hash_function() {
        for hash_function in HashFunction::ALL {
            let mut filter = CuckooFilter::builder()
                .hash_function(hash_function)
                .seed(1)
                .build()
                .unwrap();
            for key in 0u32..1_000 {
                assert!(filter.insert(key).unwrap());
            }
            for key in 0u32..1_000 {
                assert!(filter.lookup(key).unwrap(), "{:?}", hash_function);
            }
        }
    }

    #[test]
    fn test_clear() {
        let mut filter = filter(16, FieldLayout::default());
        for key in 0u8..40 {
            filter.insert(key).unwrap();
        }
        filter.clear();
        assert!(filter.is_empty());
        assert_eq!(filter.scan_occupied(), 0);
        assert!(!filter.lookup(0u8).unwrap());
    }

    #[test]
    fn test_sizing() {
        let mut filter = filter(1024, FieldLayout::plain(8, 4).unwrap());
        assert_eq!(filter.load_factor(), 0.0);
        for key in 0u64..1024 {
            filter.insert(key).unwrap();
        }
        assert!((filter.load_factor() - 0.25).abs() < 1e-9);
        assert!(filter.approximate_memory_size() >= 1024 * 8);
        assert!(filter.approximate_memory_size() < 1024 * 8 + 1024);
        let expected = 1.0 - (1.0 - 1.0 / 256.0f64).powi(8);
        assert!((filter.false_positive_rate() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_filter_trait() {
        fn exercise<F: for<'a> Filter<&'a str>>(filter: &mut F) {
            assert!(filter.insert("trait").unwrap());
            assert!(filter.contains("trait").unwrap());
            assert_eq!(filter.len(), 1);
            assert!(filter.remove("trait").unwrap());
            assert_eq!(filter.load_factor(), 0.0);
        }
        exercise(&mut filter(8, FieldLayout::default()));
    }
}
