//! This library implements Cuckoo Filters -- data structures for fast approximation of set
//! membership using little memory. Probabilistic filters like cuckoo filters are useful for
//! quickly estimating of the existence of an entity to avoid using an expensive resource.
//! For example, they can be used to [reduce disk reads] in a storage engine or to skip a round
//! trip to a remote cache.
//!
//! Unlike Bloom filters, cuckoo filters support deletion. Unlike xor filters, they can be grown
//! one key at a time. The price is that an insertion may fail once the filter is close to full;
//! callers should treat a full filter as an expected outcome and rebuild a larger one.
//!
//! Every bucket is a single 64-bit word. The word is carved into slots by a [`FieldLayout`],
//! and each slot holds a fingerprint, an in-use bit and, for counting filters, a saturating
//! counter. A displaced fingerprint finds its other bucket from the fingerprint alone
//! ([partial-key cuckoo hashing]), so keys are never stored.
//!
//! ```
//! use cuckoof::CuckooFilter;
//!
//! let mut filter = CuckooFilter::builder().num_buckets(1024).seed(7).build().unwrap();
//!
//! assert!(filter.insert("apple").unwrap());
//! assert!(filter.lookup("apple").unwrap());
//! assert!(filter.delete("apple").unwrap());
//! assert!(!filter.delete("apple").unwrap());
//! ```
//!
//! Filters are implemented as described in the paper [Cuckoo Filter: Practically Better Than
//! Bloom]. Filter state can be persisted as an opaque snapshot with the `bincode` feature
//! (on by default), and the snapshot types derive `serde` traits with the `serde` feature.
//!
//! [reduce disk reads]: https://en.wikipedia.org/wiki/Bloom_filter#Cache_filtering
//! [partial-key cuckoo hashing]: https://www.cs.cmu.edu/~dga/papers/cuckoo-conext2014.pdf
//! [Cuckoo Filter: Practically Better Than Bloom]: https://www.cs.cmu.edu/~dga/papers/cuckoo-conext2014.pdf

// Configuration attributes
#![warn(missing_docs)]
#![allow(clippy::len_without_is_empty, clippy::useless_attribute)]

mod bitfield;
mod bucket;
mod cuckoo;
mod error;
mod hash;
mod key;
#[cfg(feature = "bincode")]
mod persistence;

pub use bitfield::{FieldLayout, PackedLayout, PackedWord};
pub use bucket::Bucket;
pub use cuckoo::{
    CuckooFilter, CuckooFilterBuilder, CuckooFilterBuilderError, FilterConfig, Fingerprint, DEFAULT_MAX_KICKS,
};
pub use error::{Error, Result};
pub use hash::{mix64, HashFunction, KeyHasher};
pub use key::Key;
#[cfg(feature = "bincode")]
pub use persistence::FilterSnapshot;

/// Methods common to approximate-membership filters.
pub trait Filter<T> {
    /// Adds a key to the filter.
    ///
    /// Returns `Ok(false)` when the filter could not make room for the key. This is an expected
    /// outcome for a filter close to its capacity, not an error.
    fn insert(&mut self, key: T) -> Result<bool>;

    /// Returns `true` if the filter probably contains the specified key.
    ///
    /// A key that was inserted and never displaced out of the filter is always found, but there
    /// is a small possibility of false positives.
    fn contains(&self, key: T) -> Result<bool>;

    /// Removes one entry matching the key. The key must have been inserted before.
    fn remove(&mut self, key: T) -> Result<bool>;

    /// Returns the number of occupied fingerprint slots.
    fn len(&self) -> usize;

    /// Returns the fraction of fingerprint slots in use.
    fn load_factor(&self) -> f64;
}
