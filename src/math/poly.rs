//! Polynomials with coefficients mod Q = 8192.
//!
//! Q is a power of two, so the coefficients form Z/8192 and not a field;
//! general division is impossible, which is why [`invert`] lifts an
//! inversion mod 2 instead. Coefficients are little-endian: `v[0]` is the
//! constant term. Three padding slots follow the N real coefficients so
//! the backing array has a round size; they must read as zero outside of
//! a multiply kernel (the "normalized" contract).
//!
//! Intermediate arithmetic is allowed to wrap mod 2^16; [`Poly::clamp`]
//! masks back down to [0, Q) where a canonical value is needed.

use crate::ct;
use crate::params::{N, Q};

use super::poly2::{self, Poly2};
use super::poly3::Poly3;
use super::sample::mod3;

/// Polynomial in Z_8192[x]/(x^N - 1), stored as N + 3 u16 coefficients.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Poly {
    pub(crate) v: [u16; N + 3],
}

impl Poly {
    /// The zero polynomial.
    #[inline]
    pub const fn zero() -> Self {
        Poly { v: [0u16; N + 3] }
    }

    /// Zero the three padding slots.
    #[inline]
    pub fn normalize(&mut self) {
        self.v[N] = 0;
        self.v[N + 1] = 0;
        self.v[N + 2] = 0;
    }

    /// Debug-check the padding invariant.
    #[inline]
    pub(crate) fn assert_normalized(&self) {
        debug_assert_eq!(self.v[N], 0);
        debug_assert_eq!(self.v[N + 1], 0);
        debug_assert_eq!(self.v[N + 2], 0);
    }

    /// Reduce every coefficient to [0, Q).
    pub fn clamp(&mut self) {
        for c in self.v[..N].iter_mut() {
            *c &= Q - 1;
        }
    }

    /// Reduce mod Phi(N) by subtracting the top coefficient from every
    /// coefficient. Wraps mod 2^16; clamp afterwards if a canonical value
    /// is needed.
    pub fn mod_phi_n(&mut self) {
        let top = self.v[N - 1];
        for c in self.v[..N].iter_mut() {
            *c = c.wrapping_sub(top);
        }
    }

    /// Multiply by (x - 1) mod (x^N - 1): negate each coefficient and add
    /// in the value of the previous one, sweeping from the top down.
    pub fn mul_x_minus_1(&mut self) {
        let orig_final_coefficient = self.v[N - 1];

        for i in (1..N).rev() {
            self.v[i] = self.v[i - 1].wrapping_sub(self.v[i]);
        }
        self.v[0] = orig_final_coefficient.wrapping_sub(self.v[0]);
    }

    // ---- Conversions ------------------------------------------------------

    /// The mod-2 image of this polynomial.
    pub fn to_poly2(&self) -> Poly2 {
        let mut out = Poly2::zero();
        for i in 0..N {
            out.set_coeff(i, (self.v[i] & 1) as u64);
        }
        out
    }

    /// The mod-3 image of this polynomial. Each coefficient is treated as
    /// a signed 13-bit value (sign-extended from bit 12) before reduction.
    pub fn to_poly3(&self) -> Poly3 {
        let mut out = Poly3::zero();
        for i in 0..N {
            let v = mod3(((self.v[i] << 3) as i16) >> 3);
            out.set_coeff(i, v as u8);
        }
        out
    }

    /// Like [`Self::to_poly3`] for a polynomial whose coefficients are
    /// expected to all lie in {0, 1, Q-1}. Also returns a constant-time
    /// mask: all-ones iff every coefficient was in that set.
    ///
    /// This runs on attacker-controlled decapsulation values, so the check
    /// must not branch per coefficient.
    pub fn to_poly3_checked(&self) -> (Poly3, u64) {
        let mut out = Poly3::zero();
        let mut ok = u64::MAX;

        for i in 0..N {
            let v = self.v[i];
            // Maps {0, 1, Q-1} to {0, 1, 2}. Arbitrary inputs can also
            // produce 3, so the bit planes are written directly rather
            // than through the ternary-only setter; a 3 fails the
            // comparison below and is discarded with the rest of the
            // rejected value.
            let mut m = v & 3;
            m ^= m >> 1;
            let expected = (!((m >> 1).wrapping_sub(1)) | m) & (Q - 1);
            ok &= ct::eq_mask(v as u64, expected as u64);
            out.s.set_coeff(i, (m >> 1) as u64);
            out.a.set_coeff(i, (m | (m >> 1)) as u64);
        }

        (out, ok)
    }

    /// Lift a mod-2 polynomial to mod-Q coefficients in {0, 1}.
    pub fn from_poly2(p: &Poly2) -> Self {
        let mut out = Poly::zero();
        for i in 0..N {
            out.v[i] = p.coeff(i) as u16;
        }
        out
    }

    /// Lift a ternary polynomial to mod-2^16 coefficients in
    /// {0, 1, 0xffff}.
    pub fn from_poly3(p: &Poly3) -> Self {
        let mut out = Poly::zero();
        for i in 0..N {
            let s = p.s.coeff(i) as u16;
            let a = p.a.coeff(i) as u16;
            out.v[i] = s.wrapping_neg() | a;
        }
        out
    }
}

impl Default for Poly {
    #[inline]
    fn default() -> Self {
        Poly::zero()
    }
}

impl core::fmt::Debug for Poly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Poly")
            .field("coeffs[..4]", &&self.v[..4])
            .finish_non_exhaustive()
    }
}

impl zeroize::Zeroize for Poly {
    fn zeroize(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.v);
    }
}

// ---------------------------------------------------------------------------
// Multiplication
// ---------------------------------------------------------------------------

/// Coefficient counts below this go to schoolbook multiplication.
const SCHOOLBOOK_LIMIT: usize = 64;

/// Scratch requirement of [`mul_aux`] at n == N: each Karatsuba level
/// consumes 2*ceil(n/2), which telescopes to 702 + 352 + 176 + 88.
const MUL_SCRATCH_LEN: usize = 1318;

/// Working space for [`mul`]. The contents afterwards are meaningless,
/// but the buffer may be reused across calls by the same caller to avoid
/// repeated zero-initialisation. Never share one across concurrent calls.
pub struct MulScratch {
    prod: [u16; 2 * N],
    scratch: [u16; MUL_SCRATCH_LEN],
}

impl Default for MulScratch {
    fn default() -> Self {
        MulScratch {
            prod: [0u16; 2 * N],
            scratch: [0u16; MUL_SCRATCH_LEN],
        }
    }
}

impl zeroize::Zeroize for MulScratch {
    fn zeroize(&mut self) {
        zeroize::Zeroize::zeroize(&mut self.prod);
        zeroize::Zeroize::zeroize(&mut self.scratch);
    }
}

/// Recursive Karatsuba product of `n` coefficients from `a` and `b` into
/// `out[..2n]`, using schoolbook convolution below [`SCHOOLBOOK_LIMIT`].
///
/// The buffer layout mirrors the ternary multiplier: cross sums in
/// `out[..2*high_len]`, child scratch at offset `2*high_len`, and the
/// three sub-products at `scratch`, `out[2*low_len..]`, `out[..2*low_len]`
/// in that order. These offsets are part of the algorithm, not tunable.
fn mul_aux(out: &mut [u16], scratch: &mut [u16], a: &[u16], b: &[u16], n: usize) {
    if n < SCHOOLBOOK_LIMIT {
        out[..2 * n].fill(0);
        for i in 0..n {
            for j in 0..n {
                out[i + j] = out[i + j].wrapping_add(a[i].wrapping_mul(b[j]));
            }
        }
        return;
    }

    // Karatsuba. When n is odd the two "halves" differ in length; the
    // first is always the smaller.
    let low_len = n / 2;
    let high_len = n - low_len;

    for i in 0..low_len {
        out[i] = a[low_len + i].wrapping_add(a[i]);
        out[high_len + i] = b[low_len + i].wrapping_add(b[i]);
    }
    if high_len != low_len {
        out[low_len] = a[n - 1];
        out[high_len + low_len] = b[n - 1];
    }

    let (mid, child) = scratch.split_at_mut(2 * high_len);

    {
        let (a_cross, b_cross) = out[..2 * high_len].split_at(high_len);
        mul_aux(mid, child, a_cross, b_cross, high_len);
    }
    mul_aux(
        &mut out[2 * low_len..],
        child,
        &a[low_len..],
        &b[low_len..],
        high_len,
    );
    mul_aux(out, child, &a[..low_len], &b[..low_len], low_len);

    for i in 0..2 * low_len {
        mid[i] = mid[i].wrapping_sub(out[i].wrapping_add(out[2 * low_len + i]));
    }
    if low_len != high_len {
        mid[2 * low_len] = mid[2 * low_len].wrapping_sub(out[4 * low_len]);
        debug_assert_eq!(out[4 * low_len + 1], 0);
    }

    for i in 0..2 * high_len {
        out[low_len + i] = out[low_len + i].wrapping_add(mid[i]);
    }
}

/// `x * y` mod (x^N - 1). Coefficients wrap mod 2^16 and are not clamped.
pub fn mul(scratch: &mut MulScratch, x: &Poly, y: &Poly) -> Poly {
    x.assert_normalized();
    y.assert_normalized();

    mul_aux(
        &mut scratch.prod,
        &mut scratch.scratch,
        &x.v[..N],
        &y.v[..N],
        N,
    );

    // Reduce mod (x^N - 1): fold the upper half of the double-length
    // product onto the lower half.
    let mut out = Poly::zero();
    for i in 0..N {
        out.v[i] = scratch.prod[i].wrapping_add(scratch.prod[i + N]);
    }
    out
}

// ---------------------------------------------------------------------------
// Inversion
// ---------------------------------------------------------------------------

/// `input`^-1 mod (Q, Phi(N)), for `input` invertible by construction.
///
/// Newton lifting (NTRUTN14, bottom of page two): start from the mod-2
/// inverse and double the bits of precision per round. Q = 2^13, so
/// ceil(log2(13)) = 4 rounds suffice.
pub fn invert(scratch: &mut MulScratch, input: &Poly) -> Poly {
    // a = -input.
    let mut a = Poly::zero();
    for i in 0..N {
        a.v[i] = input.v[i].wrapping_neg();
    }

    // b = input^-1 mod 2.
    let mut b = Poly::from_poly2(&poly2::invert_mod2(&input.to_poly2()));

    for _ in 0..4 {
        let mut tmp = mul(scratch, &a, &b);
        tmp.v[0] = tmp.v[0].wrapping_add(2);
        b = mul(scratch, &b, &tmp);
    }

    b.assert_normalized();
    b
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
