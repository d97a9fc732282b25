//! Deterministic sampling of short (ternary) polynomials.
//!
//! One byte of entropy per coefficient, reduced mod 3 in constant time.
//! The final coefficient is always zero, so samples lie in the subspace
//! where reduction mod Phi(N) is free.

use crate::params::{N, SAMPLE_BYTES};

use super::poly::Poly;

/// `a` mod 3, in constant time, for any i16 input.
///
/// 21845/2^16 approximates 1/3 closely enough that the quotient estimate
/// is off by at most one over the whole i16 range, leaving a remainder in
/// [0, 3]; the final mask folds 3 back to 0.
#[inline]
pub(crate) fn mod3(a: i16) -> u16 {
    let q = ((a as i32 * 21845) >> 16) as i16;
    let ret = a.wrapping_sub(q.wrapping_mul(3));
    (ret & ((ret & (ret >> 1)).wrapping_sub(1))) as u16
}

/// Sample an element of T: coefficients in {0, 1, 0xffff} (i.e. -1 mod
/// 2^16), one per input byte, with the final coefficient fixed at zero.
pub fn short_sample(input: &[u8; SAMPLE_BYTES]) -> Poly {
    let mut out = Poly::zero();

    for (c, &byte) in out.v[..N - 1].iter_mut().zip(input.iter()) {
        let mut v = mod3(byte as i16);
        // Map 2 to 0xffff, leaving 0 and 1 alone.
        v |= ((v >> 1) ^ 1).wrapping_sub(1);
        *c = v;
    }
    // out.v[N - 1] is already zero.

    out
}

/// Sample an element of T+: like [`short_sample`], then flip the sign of
/// every even-index coefficient if the correlation sum
/// `sum(v[i] * v[i+1])` came out negative. This guarantees the
/// non-negative correlation property key generation relies on, and does
/// not change the distribution of the encapsulation inputs it is never
/// applied to.
pub fn short_sample_plus(input: &[u8; SAMPLE_BYTES]) -> Poly {
    let mut out = short_sample(input);

    // Coefficients are 0, 1 or 0xffff, so the products and the wrapping
    // sum behave exactly like signed arithmetic.
    let mut sum: u16 = 0;
    for i in 0..N - 2 {
        sum = sum.wrapping_add(out.v[i].wrapping_mul(out.v[i + 1]));
    }

    // scale = 1 if the sum is non-negative, else 0xffff.
    let sum_sign = ((sum as i16) >> 15) as u16;
    let scale = sum_sign | (!sum_sign & 1);
    for i in (0..N).step_by(2) {
        out.v[i] = out.v[i].wrapping_mul(scale);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn next(state: &mut u64) -> u64 {
        *state ^= *state << 13;
        *state ^= *state >> 7;
        *state ^= *state << 17;
        *state
    }

    #[test]
    fn mod3_matches_euclidean_remainder() {
        for a in i16::MIN..=i16::MAX {
            assert_eq!(mod3(a), a.rem_euclid(3) as u16, "a = {a}");
        }
    }

    #[test]
    fn short_sample_range_and_final_coefficient() {
        let mut state = 0xdead_beef_1234_5678u64;
        let input: [u8; SAMPLE_BYTES] = core::array::from_fn(|_| next(&mut state) as u8);

        let p = short_sample(&input);
        assert!(p.v[..N].iter().all(|&c| c == 0 || c == 1 || c == 0xffff));
        assert_eq!(p.v[N - 1], 0);
        p.assert_normalized();
    }

    #[test]
    fn short_sample_of_zeros_is_zero() {
        let p = short_sample(&[0u8; SAMPLE_BYTES]);
        assert!(p.v.iter().all(|&c| c == 0));

        let p = short_sample_plus(&[0u8; SAMPLE_BYTES]);
        assert!(p.v.iter().all(|&c| c == 0));
    }

    #[test]
    fn short_sample_plus_has_nonnegative_correlation() {
        let mut state = 0x0bad_cafe_0bad_cafeu64;

        for _ in 0..32 {
            let input: [u8; SAMPLE_BYTES] = core::array::from_fn(|_| next(&mut state) as u8);
            let p = short_sample_plus(&input);

            let mut sum: i32 = 0;
            for i in 0..N - 1 {
                let a = p.v[i] as i16 as i32;
                let b = p.v[i + 1] as i16 as i32;
                sum += a * b;
            }
            assert!(sum >= 0, "correlation {sum} is negative");
        }
    }

    #[test]
    fn short_sample_plus_only_rescales_even_indices() {
        let mut state = 0x1357_9bdf_2468_aceu64;
        let input: [u8; SAMPLE_BYTES] = core::array::from_fn(|_| next(&mut state) as u8);

        let base = short_sample(&input);
        let plus = short_sample_plus(&input);
        for i in (1..N).step_by(2) {
            assert_eq!(base.v[i], plus.v[i]);
        }
        for i in (0..N).step_by(2) {
            assert!(plus.v[i] == base.v[i] || plus.v[i] == base.v[i].wrapping_neg());
        }
    }
}
