//! Errors reported by filters and their collaborators.

/// Error type for cuckoo filter construction, hashing and persistence.
///
/// A full filter is not an error: [`CuckooFilter::insert`](crate::CuckooFilter::insert) reports
/// it as `Ok(false)`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The field layout or filter parameters cannot be realized.
    #[error("invalid configuration: {0}")]
    Configuration(String),
    /// The keyed hash function could not digest a key.
    #[error("failed to hash key: {0}")]
    Hash(String),
    /// The hash function tag is not known to this build.
    #[error("unsupported hash function tag: {0}")]
    UnsupportedHashFunction(u8),
    /// A snapshot could not be written, read, or does not describe a valid filter.
    #[error("invalid filter snapshot: {0}")]
    Persistence(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;
