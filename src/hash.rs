//! Key derivation.
//!
//! Shared keys bind the full transcript: a domain-separation label, the
//! packed message and blinding polynomials, and the ciphertext bytes all
//! feed one SHA-256 invocation. Implicit rejection keys come from an
//! HMAC-SHA-256 PRF over the ciphertext under a per-key secret, so an
//! attacker cannot distinguish a rejection from a decapsulation of a
//! different ciphertext.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use crate::params::{CIPHERTEXT_BYTES, KEY_BYTES, POLY3_BYTES};

/// Domain-separation label for shared-key derivation. The trailing NUL
/// is part of the label.
const SHARED_KEY_LABEL: &[u8; 11] = b"shared key\0";

/// Derive the shared key for an (m, r) pair and the ciphertext they
/// produced.
pub fn shared_key(
    m_bytes: &[u8; POLY3_BYTES],
    r_bytes: &[u8; POLY3_BYTES],
    ciphertext: &[u8; CIPHERTEXT_BYTES],
) -> [u8; KEY_BYTES] {
    let mut h = Sha256::new();
    h.update(SHARED_KEY_LABEL);
    h.update(m_bytes);
    h.update(r_bytes);
    h.update(ciphertext);
    h.finalize().into()
}

/// The implicit-rejection key for a ciphertext: HMAC-SHA-256 of the raw
/// ciphertext bytes under the private key's rejection secret. Computed
/// unconditionally at the start of decapsulation so that the rejection
/// path costs the same as the success path.
pub fn rejection_key(hmac_key: &[u8; KEY_BYTES], ciphertext: &[u8]) -> [u8; KEY_BYTES] {
    let mut mac =
        Hmac::<Sha256>::new_from_slice(hmac_key).expect("HMAC accepts any key length");
    mac.update(ciphertext);
    mac.finalize().into_bytes().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_key_depends_on_every_input() {
        let m = [1u8; POLY3_BYTES];
        let r = [2u8; POLY3_BYTES];
        let ct = [3u8; CIPHERTEXT_BYTES];

        let base = shared_key(&m, &r, &ct);
        let mut m2 = m;
        m2[0] ^= 1;
        assert_ne!(base, shared_key(&m2, &r, &ct));
        let mut r2 = r;
        r2[POLY3_BYTES - 1] ^= 0x80;
        assert_ne!(base, shared_key(&m, &r2, &ct));
        let mut ct2 = ct;
        ct2[7] ^= 4;
        assert_ne!(base, shared_key(&m, &r, &ct2));
    }

    #[test]
    fn rejection_key_is_a_prf_of_the_ciphertext() {
        let key = [0x42u8; KEY_BYTES];
        let a = rejection_key(&key, &[0u8; CIPHERTEXT_BYTES]);
        let b = rejection_key(&key, &[1u8; CIPHERTEXT_BYTES]);
        assert_ne!(a, b);

        let other_key = [0x43u8; KEY_BYTES];
        assert_ne!(a, rejection_key(&other_key, &[0u8; CIPHERTEXT_BYTES]));
    }
}
