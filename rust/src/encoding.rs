//! Big-endian integer key encoding.
//!
//! Byte keys compared with [`crate::BytewiseComparator`] sort the same way as
//! the integers they encode.

/// Encode `value` as 8 big-endian bytes.
#[inline]
pub fn encode_u64_be(value: u64) -> [u8; 8] {
    value.to_be_bytes()
}

/// Decode 8 big-endian bytes, or `None` if `bytes` is not exactly 8 long.
#[inline]
pub fn decode_u64_be(bytes: &[u8]) -> Option<u64> {
    bytes.try_into().ok().map(u64::from_be_bytes)
}
