//! Keyed hash functions and the avalanche mix used to derive fingerprints.

use crate::{Error, Result};
use core::convert::TryFrom;
use core::hash::Hasher;
use sha3::{Digest, Sha3_256, Sha3_512};
use siphasher::sip::SipHasher24;
use std::io::Cursor;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [`MurmurHash3`]'s finalization mix, causing bits to [avalanche].
///
/// [`MurmurHash3`]: https://github.com/aappleby/smhasher/blob/master/src/MurmurHash3.cpp
/// [avalanche]: https://en.wikipedia.org/wiki/Avalanche_effect
///
/// MurmurHash3 was written by Austin Appleby and placed in the public domain.
#[inline]
pub const fn mix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

/// Applies the finalization mix to a seeded value.
#[inline]
pub(crate) const fn mix(value: u64, seed: u64) -> u64 {
    mix64(value.wrapping_add(seed))
}

/// A deterministic keyed hash from bytes to 64 bits.
///
/// Implementations are interchangeable as long as the digest avalanches well; the filter only
/// ever sees the returned value.
pub trait KeyHasher {
    /// Digests `bytes` under `seed`.
    fn hash(&self, bytes: &[u8], seed: u32) -> Result<u64>;
}

/// The keyed hash functions a filter can be built with.
///
/// The discriminant is the tag persisted with a filter snapshot, so a restored filter hashes
/// keys exactly like the one that was saved. Tags are stable across releases.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum HashFunction {
    /// 128-bit x64 MurmurHash3, both halves folded together with xor.
    #[default]
    Murmur3 = 0,
    /// SHA3-256 over the little-endian seed followed by the key.
    Sha3_256 = 1,
    /// SHA3-512 over the little-endian seed followed by the key.
    Sha3_512 = 2,
    /// SipHash-2-4 keyed with the seed in both key halves.
    SipHash = 3,
    /// 64-bit XXH3.
    XxHash = 4,
}

impl HashFunction {
    /// Every supported hash function, in tag order.
    pub const ALL: [HashFunction; 5] = [
        HashFunction::Murmur3,
        HashFunction::Sha3_256,
        HashFunction::Sha3_512,
        HashFunction::SipHash,
        HashFunction::XxHash,
    ];

    /// Returns the persisted tag of this hash function.
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for HashFunction {
    type Error = Error;

    fn try_from(tag: u8) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.tag() == tag)
            .ok_or(Error::UnsupportedHashFunction(tag))
    }
}

/// Reads the first eight bytes of a digest as a little-endian integer.
fn fold_digest(digest: &[u8]) -> Result<u64> {
    let head = digest
        .get(..8)
        .ok_or_else(|| Error::Hash(format!("digest of {} bytes is too short", digest.len())))?;
    let mut word = [0u8; 8];
    word.copy_from_slice(head);
    Ok(u64::from_le_bytes(word))
}

impl KeyHasher for HashFunction {
    fn hash(&self, bytes: &[u8], seed: u32) -> Result<u64> {
        match self {
            HashFunction::Murmur3 => {
                let digest = murmur3::murmur3_x64_128(&mut Cursor::new(bytes), seed)
                    .map_err(|e| Error::Hash(e.to_string()))?;
                Ok((digest >> 64) as u64 ^ digest as u64)
            }
            HashFunction::Sha3_256 => {
                let mut hasher = Sha3_256::new();
                hasher.update(seed.to_le_bytes());
                hasher.update(bytes);
                fold_digest(&hasher.finalize())
            }
            HashFunction::Sha3_512 => {
                let mut hasher = Sha3_512::new();
                hasher.update(seed.to_le_bytes());
                hasher.update(bytes);
                fold_digest(&hasher.finalize())
            }
            HashFunction::SipHash => {
                let mut hasher = SipHasher24::new_with_keys(seed as u64, seed as u64);
                hasher.write(bytes);
                Ok(hasher.finish())
            }
            HashFunction::XxHash => Ok(xxhash_rust::xxh3::xxh3_64_with_seed(bytes, seed as u64)),
        }
    }
}
