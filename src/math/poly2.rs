//! Degree-N polynomials over GF(2), bit-packed into u64 words.
//!
//! Words are little-endian: the coefficient of x^0 is the LSB of the first
//! word. The final word holds only [`BITS_IN_LAST_WORD`] used bits; the
//! remaining high bits must be zero outside of a bounded window inside an
//! operation. Everything here is branch-free in the coefficient data.

use crate::ct;
use crate::params::{BITS_IN_LAST_WORD, BITS_PER_WORD, N, WORDS_PER_POLY};

/// Polynomial over GF(2) with N packed coefficient bits.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Poly2 {
    pub(crate) v: [u64; WORDS_PER_POLY],
}

impl Poly2 {
    /// The zero polynomial.
    #[inline]
    pub const fn zero() -> Self {
        Poly2 {
            v: [0; WORDS_PER_POLY],
        }
    }

    /// Read the coefficient of x^i (0 or 1).
    #[inline]
    pub fn coeff(&self, i: usize) -> u64 {
        (self.v[i / BITS_PER_WORD] >> (i % BITS_PER_WORD)) & 1
    }

    /// Set the coefficient of x^i to the low bit of `bit`.
    #[inline]
    pub(crate) fn set_coeff(&mut self, i: usize, bit: u64) {
        self.v[i / BITS_PER_WORD] |= (bit & 1) << (i % BITS_PER_WORD);
    }

    /// Reduce by Phi(N) = 1 + x + ... + x^(N-1): XOR the top coefficient
    /// into every coefficient, then clear it.
    pub fn mod_phi_n(&mut self) {
        let m = ct::lsb_to_all(self.v[WORDS_PER_POLY - 1] >> (BITS_IN_LAST_WORD - 1));
        for w in self.v.iter_mut() {
            *w ^= m;
        }
        self.v[WORDS_PER_POLY - 1] &= (1u64 << (BITS_IN_LAST_WORD - 1)) - 1;
    }

    /// Reverse the order of the first N-1 = 700 coefficients.
    ///
    /// The SAFEGCD descent operates on the reversed representation; this is
    /// a per-word bit reversal followed by a cross-word realignment shift,
    /// since 700 is not a multiple of the word size.
    pub fn reverse_700(&self) -> Self {
        let mut t = [0u64; WORDS_PER_POLY];
        for (dst, src) in t.iter_mut().zip(self.v.iter()) {
            *dst = src.reverse_bits();
        }

        const SHIFT: usize = BITS_PER_WORD - ((N - 1) % BITS_PER_WORD);
        let mut out = Poly2::zero();
        for i in 0..WORDS_PER_POLY - 1 {
            out.v[i] = t[WORDS_PER_POLY - 1 - i] >> SHIFT;
            out.v[i] |= t[WORDS_PER_POLY - 2 - i] << (BITS_PER_WORD - SHIFT);
        }
        out.v[WORDS_PER_POLY - 1] = t[0] >> SHIFT;
        out
    }

    /// Exchange `a` and `b` if `swap` is all-ones; `swap` must be all-ones
    /// or all-zero.
    pub fn cswap(a: &mut Self, b: &mut Self, swap: u64) {
        for (aw, bw) in a.v.iter_mut().zip(b.v.iter_mut()) {
            let sum = swap & (*aw ^ *bw);
            *aw ^= sum;
            *bw ^= sum;
        }
    }

    /// `self += in * m` over GF(2), i.e. `self ^= in & m`; `m` must be
    /// all-ones or all-zero.
    pub fn fmadd(&mut self, other: &Self, m: u64) {
        for (ow, iw) in self.v.iter_mut().zip(other.v.iter()) {
            *ow ^= iw & m;
        }
    }

    /// Shift every coefficient up by one position (multiply by x).
    pub fn lshift1(&mut self) {
        let mut carry = 0;
        for w in self.v.iter_mut() {
            let next_carry = *w >> (BITS_PER_WORD - 1);
            *w = (*w << 1) | carry;
            carry = next_carry;
        }
    }

    /// Shift every coefficient down by one position (divide by x,
    /// discarding the constant term).
    pub fn rshift1(&mut self) {
        let mut carry = 0;
        for w in self.v.iter_mut().rev() {
            let next_carry = *w & 1;
            *w = (*w >> 1) | (carry << (BITS_PER_WORD - 1));
            carry = next_carry;
        }
    }

    /// Mask the final word down to the N mod 64 bits actually in use.
    #[inline]
    pub fn clear_top_bits(&mut self) {
        self.v[WORDS_PER_POLY - 1] &= (1u64 << BITS_IN_LAST_WORD) - 1;
    }
}

impl zeroize::Zeroize for Poly2 {
    fn zeroize(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.v);
    }
}

/// Compute `input`^-1 mod (2, Phi(N)). Phi(N) is irreducible over GF(2)
/// for this N, so anything non-zero mod Phi(N) is invertible.
///
/// Constant-time SAFEGCD (section 7.1) over GF(2): 2(N-1)-1 fixed
/// iterations of conditional swap, conditional add, and shift on the
/// reversed representation.
pub fn invert_mod2(input: &Poly2) -> Poly2 {
    let mut v = Poly2::zero();
    let mut r = Poly2::zero();
    r.v[0] = 1;
    // f = Phi(N): all N coefficient bits set.
    let mut f = Poly2 {
        v: [u64::MAX; WORDS_PER_POLY],
    };
    f.clear_top_bits();
    // g is the reversal of the reduced input.
    let mut g = *input;
    g.mod_phi_n();
    let mut g = g.reverse_700();

    let mut delta: i32 = 1;

    for _ in 0..2 * (N - 1) - 1 {
        v.lshift1();

        // (delta >> 31) sign-extends: all-ones iff delta < 0.
        let delta_is_non_negative = !((delta >> 31) as i64 as u64);
        let delta_is_non_zero = !ct::is_zero_mask(delta as u32 as u64);
        let g_has_constant_term = ct::lsb_to_all(g.v[0]);
        let mask = g_has_constant_term & delta_is_non_negative & delta_is_non_zero;

        let c = ct::lsb_to_all(f.v[0] & g.v[0]);

        delta = ct::select_i32(mask, -delta, delta);
        delta += 1;

        Poly2::cswap(&mut f, &mut g, mask);
        g.fmadd(&f, c);
        g.rshift1();

        Poly2::cswap(&mut v, &mut r, mask);
        r.fmadd(&v, c);
    }

    debug_assert_eq!(delta, 0);
    debug_assert_eq!(f.v[0] & 1, 1);
    v.reverse_700()
}
