//! HRSS-701 parameter definitions and buffer sizes.
//!
//! All lengths are compile-time constants of the single parameter set
//! (N = 701, Q = 8192); structural relationships between them are checked
//! by const assertions at the bottom of this module.

/// Number of coefficients in every polynomial: the prime degree of the
/// NTRU ring Z[x]/(x^N - 1).
pub const N: usize = 701;

/// Coefficient modulus for [`crate::math::Poly`]. A power of two, so the
/// coefficients form Z/8192, not a field.
pub const Q: u16 = 8192;

/// Bits in one backing word of a bit-packed polynomial.
pub const BITS_PER_WORD: usize = u64::BITS as usize;

/// Words needed to hold N bits.
pub const WORDS_PER_POLY: usize = N.div_ceil(BITS_PER_WORD);

/// Used bits in the final word of a bit-packed polynomial; the rest must
/// stay zero.
pub const BITS_IN_LAST_WORD: usize = N - (WORDS_PER_POLY - 1) * BITS_PER_WORD;

/// Serialized size of a mod-Q polynomial: 13 bits per coefficient, with
/// the final coefficient omitted (it is recoverable because every
/// transmitted polynomial evaluates to zero at one).
pub const POLY_BYTES: usize = 1138;

/// Bytes of randomness consumed by one short-vector sample.
pub const SAMPLE_BYTES: usize = N - 1;

/// Serialized size of a ternary polynomial: five base-3 coefficients per
/// byte. Used only as hash input, never on the wire.
pub const POLY3_BYTES: usize = SAMPLE_BYTES / 5;

/// Serialized public-key size.
pub const PUBLIC_KEY_BYTES: usize = POLY_BYTES;

/// Ciphertext size.
pub const CIPHERTEXT_BYTES: usize = POLY_BYTES;

/// Shared-secret size (one SHA-256 digest).
pub const KEY_BYTES: usize = 32;

/// Randomness consumed by deterministic key generation: two sample seeds
/// plus the implicit-rejection HMAC key.
pub const GENERATE_BYTES: usize = 2 * SAMPLE_BYTES + 32;

/// Randomness consumed by deterministic encapsulation: seeds for the
/// message and randomizer samples.
pub const ENCAP_BYTES: usize = 2 * SAMPLE_BYTES;

const _: () = {
    assert!(N == 701);
    assert!(Q.is_power_of_two());
    assert!(WORDS_PER_POLY == 11);
    assert!(BITS_IN_LAST_WORD == 61);
    assert!(SAMPLE_BYTES == 700);
    assert!(POLY3_BYTES == 140);
    // 87 full groups of 8 coefficients at 13 bytes each, then 4 trailing
    // coefficients in 7 bytes with 4 reserved bits.
    assert!(POLY_BYTES == (N / 8) * 13 + 7);
    assert!(GENERATE_BYTES == 1432);
    assert!(ENCAP_BYTES == 1400);
};
