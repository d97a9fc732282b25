//! The lift transform used to embed the ternary message into the mod-Q
//! ciphertext: out = (m / (x - 1) mod Phi(N)) * (x - 1), computed over
//! GF(3) and then re-encoded with coefficients in {0, 1, 0xffff}.
//!
//! Dividing by (x - 1) term by term would take quadratic work, but the
//! inverse of (x - 1) mod Phi(N) over GF(3) has a rigid closed form:
//! (N - i) * 2^(i mod 2) mod 3 at index i, which cycles with period six.
//! The quotient b = m * (x - 1)^-1 therefore satisfies
//! b[i] = b[i - 3] - (m[i] + m[i - 1] + m[i - 2]), and only b[0..3] need
//! the closed form. See the NTRU-HRSS-KEM specification, section 1.8.2.

use crate::params::N;

use super::poly::Poly;
use super::sample::mod3;

/// Lift a ternary polynomial `a` into the ciphertext ring. The result is
/// divisible by (x - 1), has coefficients in {0, 1, 0xffff}, and reduces
/// to `a` mod (3, Phi(N)).
pub fn lift(a: &Poly) -> Poly {
    let mut lifted = Poly::zero();

    // b[0..3] from the closed form of (x - 1)^-1: summing the
    // contributions of a[i] to each of b[0], b[1], b[2] down the
    // period-six cycle collapses to three running sums over strided
    // windows of a, plus edge terms.
    lifted.v[0] = a.v[0].wrapping_add(a.v[2]);
    lifted.v[1] = a.v[1];
    lifted.v[2] = a.v[2].wrapping_sub(a.v[0]);

    let mut sum0: u16 = 0;
    let mut sum2: u16 = 0;
    for i in (3..699).step_by(3) {
        sum0 = sum0.wrapping_add(a.v[i + 2].wrapping_sub(a.v[i]));
        sum2 = sum2.wrapping_add(a.v[i + 1].wrapping_sub(a.v[i + 2]));
    }
    sum0 = sum0.wrapping_sub(a.v[699]);
    sum2 = sum2.wrapping_add(a.v[700]);
    // The three window sums are linearly dependent; recover the middle
    // one rather than accumulating it.
    lifted.v[0] = lifted.v[0].wrapping_add(sum0);
    lifted.v[1] = lifted.v[1].wrapping_sub(sum0.wrapping_add(sum2));
    lifted.v[2] = lifted.v[2].wrapping_add(sum2);

    // The rest of b by the order-three recurrence.
    for i in 3..N {
        lifted.v[i] = lifted.v[i - 3].wrapping_sub(
            a.v[i - 2].wrapping_add(a.v[i - 1]).wrapping_add(a.v[i]),
        );
    }

    // The recurrence accumulated arbitrary integers; renormalize mod 3
    // relative to the top coefficient (which must end up zero) and
    // re-encode 2 as 0xffff.
    let v = lifted.v[N - 1];
    for i in 0..N {
        let m = mod3(lifted.v[i].wrapping_sub(v) as i16);
        lifted.v[i] = !((m >> 1).wrapping_sub(1)) | m;
    }

    lifted.mul_x_minus_1();
    lifted.assert_normalized();
    lifted
}
