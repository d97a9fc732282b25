//! Byte serialisation of polynomials.
//!
//! Mod-Q polynomials pack 13 bits per coefficient, little-endian within
//! each byte, for the first N - 1 coefficients only: every marshalled
//! polynomial in the protocol is divisible by (x - 1), so the final
//! coefficient is the negated sum of the others and is recomputed on
//! parse. 700 coefficients is 87 groups of eight (13 bytes each) plus a
//! tail of four (7 bytes, upper nibble reserved as zero).
//!
//! Ternary polynomials pack five coefficients per byte in base 3.

use crate::params::{N, POLY3_BYTES, POLY_BYTES};

use super::poly::Poly;

/// Serialise the first N - 1 coefficients, 13 bits each. Bits above the
/// thirteenth are ignored, so the input need not be clamped.
pub fn marshal(p: &Poly) -> [u8; POLY_BYTES] {
    let mut out = [0u8; POLY_BYTES];

    for (c, bytes) in p.v[..N - 5].chunks_exact(8).zip(out.chunks_exact_mut(13)) {
        bytes[0] = c[0] as u8;
        bytes[1] = (0x1f & (c[0] >> 8)) as u8 | ((c[1] & 0x07) << 5) as u8;
        bytes[2] = (c[1] >> 3) as u8;
        bytes[3] = (3 & (c[1] >> 11)) as u8 | ((c[2] & 0x3f) << 2) as u8;
        bytes[4] = (0x7f & (c[2] >> 6)) as u8 | ((c[3] & 0x01) << 7) as u8;
        bytes[5] = (c[3] >> 1) as u8;
        bytes[6] = (0xf & (c[3] >> 9)) as u8 | ((c[4] & 0x0f) << 4) as u8;
        bytes[7] = (c[4] >> 4) as u8;
        bytes[8] = (1 & (c[4] >> 12)) as u8 | ((c[5] & 0x7f) << 1) as u8;
        bytes[9] = (0x3f & (c[5] >> 7)) as u8 | ((c[6] & 0x03) << 6) as u8;
        bytes[10] = (c[6] >> 2) as u8;
        bytes[11] = (7 & (c[6] >> 10)) as u8 | ((c[7] & 0x1f) << 3) as u8;
        bytes[12] = (c[7] >> 5) as u8;
    }

    // Final partial group of four coefficients, 52 bits in 7 bytes; the
    // top nibble of the last byte stays zero.
    let c = &p.v[N - 5..N - 1];
    let bytes = &mut out[(N / 8) * 13..];
    bytes[0] = c[0] as u8;
    bytes[1] = (0x1f & (c[0] >> 8)) as u8 | ((c[1] & 0x07) << 5) as u8;
    bytes[2] = (c[1] >> 3) as u8;
    bytes[3] = (3 & (c[1] >> 11)) as u8 | ((c[2] & 0x3f) << 2) as u8;
    bytes[4] = (0x7f & (c[2] >> 6)) as u8 | ((c[3] & 0x01) << 7) as u8;
    bytes[5] = (c[3] >> 1) as u8;
    bytes[6] = (0xf & (c[3] >> 9)) as u8;

    out
}

/// Parse the output of [`marshal`]. Returns `None` if the reserved bits
/// of the final byte are set. Coefficients come back sign-extended from
/// 13 bits to 16, and the final coefficient is reconstructed so that the
/// polynomial evaluates to zero at one. The result is normalized.
pub fn unmarshal(input: &[u8; POLY_BYTES]) -> Option<Poly> {
    let mut out = Poly::zero();

    for (c, bytes) in out.v[..N - 5]
        .chunks_exact_mut(8)
        .zip(input.chunks_exact(13))
    {
        let b: [u16; 13] = core::array::from_fn(|i| bytes[i] as u16);
        c[0] = b[0] | ((b[1] & 0x1f) << 8);
        c[1] = (b[1] >> 5) | (b[2] << 3) | ((b[3] & 3) << 11);
        c[2] = (b[3] >> 2) | ((b[4] & 0x7f) << 6);
        c[3] = (b[4] >> 7) | (b[5] << 1) | ((b[6] & 0xf) << 9);
        c[4] = (b[6] >> 4) | (b[7] << 4) | ((b[8] & 1) << 12);
        c[5] = (b[8] >> 1) | ((b[9] & 0x3f) << 7);
        c[6] = (b[9] >> 6) | (b[10] << 2) | ((b[11] & 7) << 10);
        c[7] = (b[11] >> 3) | (b[12] << 5);
    }

    let bytes = &input[(N / 8) * 13..];
    if bytes[6] & 0xf0 != 0 {
        return None;
    }
    {
        let b: [u16; 7] = core::array::from_fn(|i| bytes[i] as u16);
        let c = &mut out.v[N - 5..N - 1];
        c[0] = b[0] | ((b[1] & 0x1f) << 8);
        c[1] = (b[1] >> 5) | (b[2] << 3) | ((b[3] & 3) << 11);
        c[2] = (b[3] >> 2) | ((b[4] & 0x7f) << 6);
        c[3] = (b[4] >> 7) | (b[5] << 1) | ((b[6] & 0xf) << 9);
    }

    let mut sum: u16 = 0;
    for c in out.v[..N - 1].iter_mut() {
        // Sign-extend from 13 bits.
        *c = (((*c << 3) as i16) >> 3) as u16;
        sum = sum.wrapping_add(*c);
    }
    out.v[N - 1] = sum.wrapping_neg();

    Some(out)
}

/// `v` mod 3 for `v` in {0, 1, Q-1} (i.e. -1): only the low two bits
/// distinguish the three cases.
#[inline]
fn mod3_from_modq(v: u16) -> u16 {
    let v = v & 3;
    v ^ (v >> 1)
}

/// Serialise a ternary polynomial with coefficients in {0, 1, Q-1} (or
/// the 0xffff encoding of -1), five coefficients per byte in base 3. The
/// final coefficient must be zero and is not encoded.
pub fn marshal_mod3(p: &Poly) -> [u8; POLY3_BYTES] {
    debug_assert_eq!(p.v[N - 1], 0);

    let mut out = [0u8; POLY3_BYTES];
    for (byte, c) in out.iter_mut().zip(p.v[..N - 1].chunks_exact(5)) {
        *byte = (mod3_from_modq(c[0])
            + mod3_from_modq(c[1]) * 3
            + mod3_from_modq(c[2]) * 9
            + mod3_from_modq(c[3]) * 27
            + mod3_from_modq(c[4]) * 81) as u8;
    }
    out
}
