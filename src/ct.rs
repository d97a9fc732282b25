//! Constant-time primitives: word masks, select, byte comparison, and
//! conditional copy. No secret-dependent branching anywhere in this module.
//!
//! Masks are always canonical: all-ones or all-zero. Functions taking a
//! mask argument require one of those two values.

use core::hint::black_box;

/// Replicate the least-significant bit of `v` to every bit of the word.
#[inline]
pub fn lsb_to_all(v: u64) -> u64 {
    (v & 1).wrapping_neg()
}

/// All-ones if `v == 0`, all-zero otherwise.
#[inline]
pub fn is_zero_mask(v: u64) -> u64 {
    let v = black_box(v);
    ((v | v.wrapping_neg()) >> 63).wrapping_sub(1)
}

/// All-ones if `a == b`, all-zero otherwise.
#[inline]
pub fn eq_mask(a: u64, b: u64) -> u64 {
    is_zero_mask(a ^ b)
}

/// Select `a` if `mask` is all-ones, `b` if all-zero.
#[inline]
pub fn select_i32(mask: u64, a: i32, b: i32) -> i32 {
    let m = mask as u32;
    ((m & a as u32) | (!m & b as u32)) as i32
}

/// Constant-time byte-slice comparison. Returns 0 if a == b, 1 otherwise.
/// Same length required.
#[inline]
pub fn ct_verify(a: &[u8], b: &[u8]) -> u8 {
    assert_eq!(a.len(), b.len(), "ct_verify: length mismatch");

    let mut diff: u64 = 0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        diff |= (x ^ y) as u64;
    }
    // Fence: prevent the optimiser from short-circuiting the loop.
    let diff = black_box(diff);
    // Map 0 -> 0, nonzero -> 1 without branching.
    (diff.wrapping_neg() >> 63) as u8
}

/// Constant-time conditional copy. If condition==1 overwrites dst with src;
/// if 0, dst unchanged. Panics if condition not 0/1 or lengths differ.
#[inline]
pub fn ct_cmov(dst: &mut [u8], src: &[u8], condition: u8) {
    assert_eq!(dst.len(), src.len(), "ct_cmov: length mismatch");
    debug_assert!(condition <= 1, "ct_cmov: condition must be 0 or 1");

    // Fence the condition so the mask isn't optimised into a branch.
    let mask = black_box(condition).wrapping_neg(); // 0x00 or 0xFF

    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d ^= mask & (*d ^ s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lsb_broadcast() {
        assert_eq!(lsb_to_all(0), 0);
        assert_eq!(lsb_to_all(1), u64::MAX);
        assert_eq!(lsb_to_all(0xfffe), 0);
        assert_eq!(lsb_to_all(u64::MAX), u64::MAX);
    }

    #[test]
    fn zero_and_eq_masks() {
        assert_eq!(is_zero_mask(0), u64::MAX);
        assert_eq!(is_zero_mask(1), 0);
        assert_eq!(is_zero_mask(u64::MAX), 0);
        assert_eq!(eq_mask(42, 42), u64::MAX);
        assert_eq!(eq_mask(42, 43), 0);
    }

    #[test]
    fn select_follows_mask() {
        assert_eq!(select_i32(u64::MAX, -7, 7), -7);
        assert_eq!(select_i32(0, -7, 7), 7);
    }

    #[test]
    fn verify_equal() {
        let a = [0u8; 64];
        let b = [0u8; 64];
        assert_eq!(ct_verify(&a, &b), 0);
    }

    #[test]
    fn verify_differ_last_byte() {
        let a = [0u8; 64];
        let mut b = [0u8; 64];
        b[63] = 0x80;
        assert_eq!(ct_verify(&a, &b), 1);
    }

    #[test]
    fn cmov_condition_zero_is_noop() {
        let mut dst = [0xAA_u8; 32];
        let src = [0xBB_u8; 32];
        ct_cmov(&mut dst, &src, 0);
        assert!(dst.iter().all(|&b| b == 0xAA));
    }

    #[test]
    fn cmov_condition_one_copies() {
        let mut dst = [0xAA_u8; 32];
        let src = [0xBB_u8; 32];
        ct_cmov(&mut dst, &src, 1);
        assert!(dst.iter().all(|&b| b == 0xBB));
    }
}
