// Copyright 2026 the Rencache Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 32-bit FNV-1a.

/// Offset basis of 32-bit FNV-1a; every tile starts each frame at this value.
pub const HASH_INITIAL: u32 = 2_166_136_261;

const FNV_PRIME: u32 = 16_777_619;

/// Folds `data` into the running FNV-1a hash `hash`.
#[inline]
pub fn fnv1a(hash: u32, data: &[u8]) -> u32 {
    data.iter()
        .fold(hash, |h, &byte| (h ^ u32::from(byte)).wrapping_mul(FNV_PRIME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_reference_values() {
        assert_eq!(fnv1a(HASH_INITIAL, b""), 0x811c_9dc5);
        assert_eq!(fnv1a(HASH_INITIAL, b"a"), 0xe40c_292c);
        assert_eq!(fnv1a(HASH_INITIAL, b"foobar"), 0xbf9c_f968);
    }

    #[test]
    fn fnv1a_is_order_sensitive() {
        assert_ne!(fnv1a(HASH_INITIAL, b"ab"), fnv1a(HASH_INITIAL, b"ba"));
        assert_eq!(
            fnv1a(fnv1a(HASH_INITIAL, b"ab"), b"cd"),
            fnv1a(HASH_INITIAL, b"abcd")
        );
    }
}
