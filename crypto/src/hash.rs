//! Blake2b-256 hashing for blocks, transactions, and state digests.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(blake2b_256(b"meridian"), blake2b_256(b"meridian"));
        assert_ne!(blake2b_256(b"meridian"), blake2b_256(b"meridiam"));
    }

    #[test]
    fn multi_matches_concatenation() {
        assert_eq!(
            blake2b_256_multi(&[b"ab", b"cd"]),
            blake2b_256(b"abcd"),
        );
    }

    #[test]
    fn empty_input_hashes() {
        // Blake2b of the empty string is well-defined and non-zero.
        assert_ne!(blake2b_256(b""), [0u8; 32]);
    }
}
