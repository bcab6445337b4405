//! Canonical byte encoding of filter keys.

use std::borrow::Cow;

/// A key accepted by a filter.
///
/// Every supported key kind has exactly one byte encoding, chosen once when the key is
/// converted, so the hashing path never dispatches on the key's type. Numbers are encoded
/// big-endian at their own width, floats through their IEEE-754 bit pattern, text as UTF-8 and
/// byte strings as-is. `isize` and `usize` are widened to 64 bits so that a filter persisted on
/// one platform answers identically on another.
///
/// ```
/// use cuckoof::Key;
///
/// assert_eq!(Key::from(1u16).to_bytes().as_ref(), &[0, 1]);
/// assert_eq!(Key::from("ab").to_bytes().as_ref(), b"ab");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Key<'a> {
    /// A signed 8-bit integer.
    I8(i8),
    /// A signed 16-bit integer.
    I16(i16),
    /// A signed 32-bit integer.
    I32(i32),
    /// A signed 64-bit integer.
    I64(i64),
    /// An unsigned 8-bit integer.
    U8(u8),
    /// An unsigned 16-bit integer.
    U16(u16),
    /// An unsigned 32-bit integer.
    U32(u32),
    /// An unsigned 64-bit integer.
    U64(u64),
    /// A 32-bit float.
    F32(f32),
    /// A 64-bit float.
    F64(f64),
    /// UTF-8 text.
    Str(&'a str),
    /// Raw bytes.
    Bytes(&'a [u8]),
}

impl<'a> Key<'a> {
    /// Returns the canonical encoding of the key. Text and byte keys are borrowed.
    pub fn to_bytes(&self) -> Cow<'a, [u8]> {
        match *self {
            Key::I8(v) => Cow::Owned(v.to_be_bytes().to_vec()),
            Key::I16(v) => Cow::Owned(v.to_be_bytes().to_vec()),
            Key::I32(v) => Cow::Owned(v.to_be_bytes().to_vec()),
            Key::I64(v) => Cow::Owned(v.to_be_bytes().to_vec()),
            Key::U8(v) => Cow::Owned(vec![v]),
            Key::U16(v) => Cow::Owned(v.to_be_bytes().to_vec()),
            Key::U32(v) => Cow::Owned(v.to_be_bytes().to_vec()),
            Key::U64(v) => Cow::Owned(v.to_be_bytes().to_vec()),
            Key::F32(v) => Cow::Owned(v.to_bits().to_be_bytes().to_vec()),
            Key::F64(v) => Cow::Owned(v.to_bits().to_be_bytes().to_vec()),
            Key::Str(s) => Cow::Borrowed(s.as_bytes()),
            Key::Bytes(b) => Cow::Borrowed(b),
        }
    }
}

macro_rules! key_from(
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Key<'_> {
                fn from(v: $ty) -> Self {
                    Key::$variant(v)
                }
            }
        )*
    };
);

key_from!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    f32 => F32,
    f64 => F64,
);

impl From<isize> for Key<'_> {
    fn from(v: isize) -> Self {
        Key::I64(v as i64)
    }
}

impl From<usize> for Key<'_> {
    fn from(v: usize) -> Self {
        Key::U64(v as u64)
    }
}

impl<'a> From<&'a str> for Key<'a> {
    fn from(s: &'a str) -> Self {
        Key::Str(s)
    }
}

impl<'a> From<&'a String> for Key<'a> {
    fn from(s: &'a String) -> Self {
        Key::Str(s.as_str())
    }
}

impl<'a> From<&'a [u8]> for Key<'a> {
    fn from(b: &'a [u8]) -> Self {
        Key::Bytes(b)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Key<'a> {
    fn from(b: &'a [u8; N]) -> Self {
        Key::Bytes(b)
    }
}

impl<'a> From<&'a Vec<u8>> for Key<'a> {
    fn from(b: &'a Vec<u8>) -> Self {
        Key::Bytes(b.as_slice())
    }
}

#[cfg(test)]
mod test {
    use super::Key;

    #[test]
    fn test_integer_encoding_is_big_endian() {
        assert_eq!(Key::from(-1i8).to_bytes().as_ref(), &[0xff]);
        assert_eq!(Key::from(0x0102u16).to_bytes().as_ref(), &[1, 2]);
        assert_eq!(Key::from(0x0102_0304i32).to_bytes().as_ref(), &[1, 2, 3, 4]);
        assert_eq!(
            Key::from(1u64).to_bytes().as_ref(),
            &[0, 0, 0, 0, 0, 0, 0, 1]
        );
    }

    #[test]
    fn test_platform_integers_widen() {
        assert_eq!(Key::from(7usize), Key::U64(7));
        assert_eq!(Key::from(-7isize), Key::I64(-7));
    }

    #[test]
    fn test_float_encoding_uses_bits() {
        assert_eq!(
            Key::from(1.0f32).to_bytes().as_ref(),
            &1.0f32.to_bits().to_be_bytes()
        );
        // Signed zeroes are distinct keys.
        assert_ne!(Key::from(0.0f64).to_bytes(), Key::from(-0.0f64).to_bytes());
    }

    #[test]
    fn test_widths_are_distinct_keys() {
        assert_ne!(Key::from(1u8).to_bytes(), Key::from(1u16).to_bytes());
    }

    #[test]
    fn test_text_and_bytes_borrow() {
        let owned = String::from("borrowed");
        let bytes = Key::from(&owned).to_bytes();
        assert!(matches!(bytes, std::borrow::Cow::Borrowed(_)));
        assert_eq!(Key::from("ab").to_bytes(), Key::from(b"ab").to_bytes());
    }
}
