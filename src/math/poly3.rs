//! Degree-N polynomials over GF(3), bitsliced.
//!
//! Each coefficient is spread across a `(s, a)` bit pair held in two
//! parallel [`Poly2`]-shaped bit vectors:
//!
//! ```text
//!   s | a | value
//!  ---------------
//!   0 | 0 | 0
//!   0 | 1 | 1
//!   1 | 1 | -1 (aka 2)
//!   1 | 0 | <invalid>
//! ```
//!
//! ('s' is for sign, 'a' is the absolute value.) Arithmetic mod 3 is then
//! a handful of fixed boolean circuits applied word-wise, so one u64
//! operation processes 64 coefficients with no secret-dependent branching.
//! Negation is just `s ^= a`.

use crate::ct;
use crate::params::{BITS_IN_LAST_WORD, BITS_PER_WORD, N, WORDS_PER_POLY};

use super::poly2::Poly2;

/// Bitsliced polynomial over GF(3).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Poly3 {
    pub(crate) s: Poly2,
    pub(crate) a: Poly2,
}

// Word-level circuits. These formulas are load-bearing: together with the
// (s, a) encoding above they define the whole mod-3 arithmetic layer.

/// (s3, a3) = (s1, a1) x (s2, a2).
#[inline]
pub(crate) fn word_mul(s1: u64, a1: u64, s2: u64, a2: u64) -> (u64, u64) {
    let a3 = a1 & a2;
    ((s1 ^ s2) & a3, a3)
}

/// (s3, a3) = (s1, a1) + (s2, a2).
#[inline]
pub(crate) fn word_add(s1: u64, a1: u64, s2: u64, a2: u64) -> (u64, u64) {
    let t = s1 ^ a2;
    (t & (s2 ^ a1), (a1 ^ a2) | (t ^ s2))
}

/// (s3, a3) = (s1, a1) - (s2, a2).
#[inline]
pub(crate) fn word_sub(s1: u64, a1: u64, s2: u64, a2: u64) -> (u64, u64) {
    let t = a1 ^ a2;
    ((s1 ^ a2) & (t ^ s2), t | (s1 ^ s2))
}

/// Replicate the bit at the top coefficient position of a final word to
/// the whole word.
#[inline]
fn final_bit_to_all(v: u64) -> u64 {
    ct::lsb_to_all(v >> (BITS_IN_LAST_WORD - 1))
}

impl Poly3 {
    /// The zero polynomial.
    #[inline]
    pub const fn zero() -> Self {
        Poly3 {
            s: Poly2::zero(),
            a: Poly2::zero(),
        }
    }

    /// Read coefficient i as 0, 1, or 2.
    #[inline]
    pub fn coeff(&self, i: usize) -> u8 {
        let s = self.s.coeff(i) as u8;
        let a = self.a.coeff(i) as u8;
        debug_assert!(!(s == 1 && a == 0), "invalid (s=1, a=0) combination");
        s + a
    }

    /// Set coefficient i from a value in {0, 1, 2}.
    #[inline]
    pub(crate) fn set_coeff(&mut self, i: usize, v: u8) {
        debug_assert!(v <= 2);
        self.s.set_coeff(i, (v >> 1) as u64);
        self.a.set_coeff(i, ((v | (v >> 1)) & 1) as u64);
    }

    /// Multiply every coefficient by the ternary scalar in the low bits of
    /// `(ms, ma)`.
    pub fn mul_const(&mut self, ms: u64, ma: u64) {
        let ms = ct::lsb_to_all(ms);
        let ma = ct::lsb_to_all(ma);

        for i in 0..WORDS_PER_POLY {
            let (s, a) = word_mul(self.s.v[i], self.a.v[i], ms, ma);
            self.s.v[i] = s;
            self.a.v[i] = a;
        }
    }

    /// `self -= in * m`, where m is the broadcast ternary scalar
    /// `(ms, ma)`; both must already be all-ones or all-zero.
    pub fn fmsub(&mut self, other: &Self, ms: u64, ma: u64) {
        for i in 0..WORDS_PER_POLY {
            let (ps, pa) = word_mul(other.s.v[i], other.a.v[i], ms, ma);
            let (s, a) = word_sub(self.s.v[i], self.a.v[i], ps, pa);
            self.s.v[i] = s;
            self.a.v[i] = a;
        }
    }

    /// Negate every coefficient.
    pub fn negate(&mut self) {
        for i in 0..WORDS_PER_POLY {
            self.s.v[i] ^= self.a.v[i];
        }
    }

    /// Reduce by Phi(N): subtract the top coefficient from every
    /// coefficient, then clear it.
    pub fn mod_phi_n(&mut self) {
        let factor_s = final_bit_to_all(self.s.v[WORDS_PER_POLY - 1]);
        let factor_a = final_bit_to_all(self.a.v[WORDS_PER_POLY - 1]);

        for i in 0..WORDS_PER_POLY {
            let (s, a) = word_sub(self.s.v[i], self.a.v[i], factor_s, factor_a);
            self.s.v[i] = s;
            self.a.v[i] = a;
        }

        // The subtraction zeroed the top coefficient itself; only the
        // alignment bits above it need clearing.
        self.s.clear_top_bits();
        self.a.clear_top_bits();
    }

    /// Exchange `a` and `b` if `swap` is all-ones.
    pub fn cswap(a: &mut Self, b: &mut Self, swap: u64) {
        Poly2::cswap(&mut a.s, &mut b.s, swap);
        Poly2::cswap(&mut a.a, &mut b.a, swap);
    }

    /// Multiply by x.
    pub fn lshift1(&mut self) {
        self.s.lshift1();
        self.a.lshift1();
    }

    /// Divide by x, discarding the constant term.
    pub fn rshift1(&mut self) {
        self.s.rshift1();
        self.a.rshift1();
    }

    /// Reverse the order of the first 700 coefficients.
    pub fn reverse_700(&self) -> Self {
        Poly3 {
            s: self.s.reverse_700(),
            a: self.a.reverse_700(),
        }
    }
}

impl zeroize::Zeroize for Poly3 {
    fn zeroize(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.s);
        zeroize::Zeroize::zeroize(&mut self.a);
    }
}

// ---------------------------------------------------------------------------
// Multiplication
// ---------------------------------------------------------------------------

/// Words of scratch needed by the top-level Karatsuba recursion. For n in
/// {11, 22} the transitive requirement works out to 2n + 2.
const MUL_SCRATCH_WORDS: usize = 2 * WORDS_PER_POLY + 2;

/// Recursive Karatsuba multiply of `n` words from (a_s, a_a) and
/// (b_s, b_a) into 2n words of (out_s, out_a).
///
/// Each level consumes 2*ceil(n/2) words of scratch and recurses with the
/// remainder; at n == 1 a word-granular schoolbook kernel takes over. The
/// offsets are a contract: with `low_len = n/2` (the smaller half first)
/// and `high_len = n - low_len`, the cross sums live in
/// `out[..2*high_len]`, the child scratch starts at `scratch[2*high_len]`,
/// and the three sub-products land at `scratch`, `out[2*low_len..]`, and
/// `out[..2*low_len]`, in that order.
#[allow(clippy::too_many_arguments)]
fn mul_aux(
    out_s: &mut [u64],
    out_a: &mut [u64],
    scratch_s: &mut [u64],
    scratch_a: &mut [u64],
    a_s: &[u64],
    a_a: &[u64],
    b_s: &[u64],
    b_a: &[u64],
    n: usize,
) {
    if n == 1 {
        // Schoolbook base case: multiply one word's worth of coefficients
        // of b against a, one bit position at a time, accumulating shifted
        // partial products into a low and a high output word.
        let (mut r_s_low, mut r_s_high, mut r_a_low, mut r_a_high) = (0u64, 0u64, 0u64, 0u64);
        let (mut b_s0, mut b_a0) = (b_s[0], b_a[0]);
        let (a_s0, a_a0) = (a_s[0], a_a[0]);

        for i in 0..BITS_PER_WORD {
            let (m_s, m_a) = word_mul(a_s0, a_a0, ct::lsb_to_all(b_s0), ct::lsb_to_all(b_a0));
            b_s0 >>= 1;
            b_a0 >>= 1;

            if i == 0 {
                // A shift by BITS_PER_WORD below would overflow.
                r_s_low = m_s;
                r_a_low = m_a;
                continue;
            }

            let m_s_low = m_s << i;
            let m_s_high = m_s >> (BITS_PER_WORD - i);
            let m_a_low = m_a << i;
            let m_a_high = m_a >> (BITS_PER_WORD - i);

            (r_s_low, r_a_low) = word_add(r_s_low, r_a_low, m_s_low, m_a_low);
            (r_s_high, r_a_high) = word_add(r_s_high, r_a_high, m_s_high, m_a_high);
        }

        out_s[0] = r_s_low;
        out_s[1] = r_s_high;
        out_a[0] = r_a_low;
        out_a[1] = r_a_high;
        return;
    }

    // Karatsuba. When n is odd the two "halves" differ in length; the
    // first is always the smaller.
    let low_len = n / 2;
    let high_len = n - low_len;

    // a_1 + a_0 goes in out[..high_len], b_1 + b_0 in the next high_len.
    for i in 0..low_len {
        let (s, a) = word_add(a_s[i], a_a[i], a_s[low_len + i], a_a[low_len + i]);
        out_s[i] = s;
        out_a[i] = a;
        let (s, a) = word_add(b_s[i], b_a[i], b_s[low_len + i], b_a[low_len + i]);
        out_s[high_len + i] = s;
        out_a[high_len + i] = a;
    }
    if high_len != low_len {
        out_s[low_len] = a_s[n - 1];
        out_a[low_len] = a_a[n - 1];
        out_s[high_len + low_len] = b_s[n - 1];
        out_a[high_len + low_len] = b_a[n - 1];
    }

    let (mid_s, child_s) = scratch_s.split_at_mut(2 * high_len);
    let (mid_a, child_a) = scratch_a.split_at_mut(2 * high_len);

    // (a_1 + a_0) x (b_1 + b_0) into the scratch buffer.
    {
        let (a_cross_s, b_cross_s) = out_s[..2 * high_len].split_at(high_len);
        let (a_cross_a, b_cross_a) = out_a[..2 * high_len].split_at(high_len);
        mul_aux(
            mid_s, mid_a, child_s, child_a, a_cross_s, a_cross_a, b_cross_s, b_cross_a, high_len,
        );
    }
    // a_1 x b_1. This clobbers the tail of the cross sums, which are
    // already consumed.
    mul_aux(
        &mut out_s[2 * low_len..],
        &mut out_a[2 * low_len..],
        child_s,
        child_a,
        &a_s[low_len..],
        &a_a[low_len..],
        &b_s[low_len..],
        &b_a[low_len..],
        high_len,
    );
    // a_0 x b_0.
    mul_aux(
        out_s,
        out_a,
        child_s,
        child_a,
        &a_s[..low_len],
        &a_a[..low_len],
        &b_s[..low_len],
        &b_a[..low_len],
        low_len,
    );

    // Subtract the outer products from the cross product.
    for i in 0..2 * low_len {
        let (s, a) = word_sub(mid_s[i], mid_a[i], out_s[i], out_a[i]);
        mid_s[i] = s;
        mid_a[i] = a;
    }
    for i in 0..2 * high_len {
        let (s, a) = word_sub(mid_s[i], mid_a[i], out_s[2 * low_len + i], out_a[2 * low_len + i]);
        mid_s[i] = s;
        mid_a[i] = a;
    }

    // Add the middle product into the output.
    for i in 0..2 * high_len {
        let (s, a) = word_add(out_s[low_len + i], out_a[low_len + i], mid_s[i], mid_a[i]);
        out_s[low_len + i] = s;
        out_a[low_len + i] = a;
    }
}

/// `x * y` mod Phi(N).
pub fn mul(x: &Poly3, y: &Poly3) -> Poly3 {
    let mut prod_s = [0u64; WORDS_PER_POLY * 2];
    let mut prod_a = [0u64; WORDS_PER_POLY * 2];
    let mut scratch_s = [0u64; MUL_SCRATCH_WORDS];
    let mut scratch_a = [0u64; MUL_SCRATCH_WORDS];

    mul_aux(
        &mut prod_s,
        &mut prod_a,
        &mut scratch_s,
        &mut scratch_a,
        &x.s.v,
        &x.a.v,
        &y.s.v,
        &y.a.v,
        WORDS_PER_POLY,
    );

    // Reduce mod (x^N - 1) by adding the upper half into the lower half.
    // N isn't a multiple of the word size, so the upper-half words must be
    // realigned by a sub-word shift first.
    let mut out = Poly3::zero();
    for i in 0..WORDS_PER_POLY {
        let mut v_s = prod_s[WORDS_PER_POLY + i - 1] >> BITS_IN_LAST_WORD;
        v_s |= prod_s[WORDS_PER_POLY + i] << (BITS_PER_WORD - BITS_IN_LAST_WORD);
        let mut v_a = prod_a[WORDS_PER_POLY + i - 1] >> BITS_IN_LAST_WORD;
        v_a |= prod_a[WORDS_PER_POLY + i] << (BITS_PER_WORD - BITS_IN_LAST_WORD);

        let (s, a) = word_add(prod_s[i], prod_a[i], v_s, v_a);
        out.s.v[i] = s;
        out.a.v[i] = a;
    }

    out.mod_phi_n();
    out
}

// ---------------------------------------------------------------------------
// Inversion
// ---------------------------------------------------------------------------

/// Compute `input`^-1 mod Phi(N), i.e. the unique `out` with
/// `out * input == 1`. The input is presumed invertible, which holds by
/// construction for every value this protocol inverts.
///
/// Constant-time SAFEGCD descent (section 7.1 of the paper): 2(N-1)-1
/// fixed iterations over the state (f, g, v, r, delta), operating on the
/// bit-reversed representation. The iteration count and control flow are
/// entirely input-independent.
pub fn invert(input: &Poly3) -> Poly3 {
    let mut v = Poly3::zero();
    let mut r = Poly3::zero();
    r.a.v[0] = 1;
    // f = Phi(N): every coefficient one.
    let mut f = Poly3::zero();
    f.a.v = [u64::MAX; WORDS_PER_POLY];
    f.a.clear_top_bits();
    // g is the reversal of the input.
    let mut g = input.reverse_700();

    let mut delta: i32 = 1;

    for _ in 0..2 * (N - 1) - 1 {
        v.lshift1();

        let delta_is_non_negative = !((delta >> 31) as i64 as u64);
        let delta_is_non_zero = !ct::is_zero_mask(delta as u32 as u64);
        let g_has_constant_term = ct::lsb_to_all(g.a.v[0]);
        let mask = g_has_constant_term & delta_is_non_negative & delta_is_non_zero;

        let (c_s, c_a) = word_mul(f.s.v[0], f.a.v[0], g.s.v[0], g.a.v[0]);
        let c_s = ct::lsb_to_all(c_s);
        let c_a = ct::lsb_to_all(c_a);

        delta = ct::select_i32(mask, -delta, delta);
        delta += 1;

        Poly3::cswap(&mut f, &mut g, mask);
        g.fmsub(&f, c_s, c_a);
        g.rshift1();

        Poly3::cswap(&mut v, &mut r, mask);
        r.fmsub(&v, c_s, c_a);
    }

    // A non-zero delta here is a logic error, not an input-dependent
    // condition.
    debug_assert_eq!(delta, 0);
    v.mul_const(f.s.v[0], f.a.v[0]);
    v.reverse_700()
}

#[cfg(test)]
mod tests {
    use super::*;

    // xorshift64, good enough for deterministic test vectors.
    fn next(state: &mut u64) -> u64 {
        *state ^= *state << 13;
        *state ^= *state >> 7;
        *state ^= *state << 17;
        *state
    }

    fn random_ternary(state: &mut u64) -> Poly3 {
        let mut p = Poly3::zero();
        // Keep the top coefficient zero: inputs to invert are reduced
        // mod Phi(N).
        for i in 0..N - 1 {
            p.set_coeff(i, (next(state) % 3) as u8);
        }
        p
    }

    fn to_coeffs(p: &Poly3) -> Vec<u8> {
        (0..N).map(|i| p.coeff(i)).collect()
    }

    #[test]
    fn word_circuits_match_mod3_tables() {
        for v1 in 0u8..3 {
            for v2 in 0u8..3 {
                let mut p1 = Poly3::zero();
                let mut p2 = Poly3::zero();
                p1.set_coeff(0, v1);
                p2.set_coeff(0, v2);

                let (s, a) = word_mul(p1.s.v[0], p1.a.v[0], p2.s.v[0], p2.a.v[0]);
                assert_eq!(((s & 1) + (a & 1)) as u8, (v1 * v2) % 3, "{v1} * {v2}");

                let (s, a) = word_add(p1.s.v[0], p1.a.v[0], p2.s.v[0], p2.a.v[0]);
                assert_eq!(((s & 1) + (a & 1)) as u8, (v1 + v2) % 3, "{v1} + {v2}");

                let (s, a) = word_sub(p1.s.v[0], p1.a.v[0], p2.s.v[0], p2.a.v[0]);
                assert_eq!(((s & 1) + (a & 1)) as u8, (3 + v1 - v2) % 3, "{v1} - {v2}");
            }
        }
    }

    #[test]
    fn negate_flips_every_coefficient() {
        let mut state = 0x1234_5678_9abc_def0u64;
        let p = random_ternary(&mut state);
        let mut neg = p;
        neg.negate();
        for i in 0..N {
            assert_eq!((p.coeff(i) + neg.coeff(i)) % 3, 0, "coefficient {i}");
        }
    }

    #[test]
    fn mul_matches_schoolbook_reference() {
        let mut state = 0xdead_beef_cafe_f00du64;
        for _ in 0..4 {
            let x = random_ternary(&mut state);
            let y = random_ternary(&mut state);
            let got = mul(&x, &y);

            // Reference: convolution mod (x^N - 1), then reduce mod Phi(N)
            // by subtracting the top coefficient.
            let (xc, yc) = (to_coeffs(&x), to_coeffs(&y));
            let mut ref_c = vec![0u32; N];
            for i in 0..N {
                for j in 0..N {
                    ref_c[(i + j) % N] += (xc[i] * yc[j]) as u32;
                }
            }
            let top = ref_c[N - 1] % 3;
            for c in ref_c.iter_mut() {
                *c = (*c + 2 * top) % 3; // subtracting top == adding 2*top
            }

            for i in 0..N {
                assert_eq!(got.coeff(i) as u32, ref_c[i], "coefficient {i}");
            }
        }
    }

    #[test]
    fn mul_by_one_is_identity() {
        let mut state = 7u64;
        let x = random_ternary(&mut state);
        let mut one = Poly3::zero();
        one.set_coeff(0, 1);
        assert_eq!(mul(&x, &one), x);
    }

    #[test]
    fn invert_gives_multiplicative_inverse() {
        let mut state = 0x0bad_5eed_0bad_5eedu64;
        let mut one = Poly3::zero();
        one.set_coeff(0, 1);

        for _ in 0..3 {
            let x = random_ternary(&mut state);
            let x_inv = invert(&x);
            assert_eq!(mul(&x, &x_inv), one);
        }
    }

    #[test]
    fn invert_is_an_involution() {
        let mut state = 42u64;
        let x = random_ternary(&mut state);
        assert_eq!(invert(&invert(&x)), x);
    }
}
