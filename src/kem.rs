//! Key generation, encapsulation and decapsulation.
//!
//! The `_derand` variants are the deterministic cores: they consume a
//! fixed-size block of caller-supplied entropy and are what known-answer
//! tests drive. The randomized wrappers just draw that block from a
//! [`CryptoRng`].
//!
//! Decapsulation never fails. Any malformed or forged ciphertext yields
//! the implicit-rejection key, a PRF of the ciphertext under a secret
//! carried in the private key, through code whose timing does not depend
//! on which path was taken.

use rand_core::CryptoRng;
use zeroize::Zeroize;

use crate::math::{lift, pack, poly, poly3, sample, MulScratch, Poly};
use crate::params::{CIPHERTEXT_BYTES, ENCAP_BYTES, GENERATE_BYTES, N, SAMPLE_BYTES};
use crate::types::{Ciphertext, PrivateKey, PublicKey, SharedSecret};
use crate::{ct, hash};

/// Deterministic key generation from `GENERATE_BYTES` of entropy: two
/// sample blocks for f and g, then 32 bytes of implicit-rejection secret.
pub fn keypair_derand(input: &[u8; GENERATE_BYTES]) -> (PublicKey, PrivateKey) {
    let mut scratch = MulScratch::default();

    let f_bytes: &[u8; SAMPLE_BYTES] = input[..SAMPLE_BYTES].try_into().unwrap();
    let g_bytes: &[u8; SAMPLE_BYTES] =
        input[SAMPLE_BYTES..2 * SAMPLE_BYTES].try_into().unwrap();
    let hmac_key: [u8; 32] = input[2 * SAMPLE_BYTES..].try_into().unwrap();

    let mut f = sample::short_sample_plus(f_bytes);
    let f3 = f.to_poly3();
    let f3_inverse = poly3::invert(&f3);

    // pg_phi1 = 3 * g * (x - 1). Inverting f * pg_phi1 once yields both
    // h = pg_phi1 / f and h^-1 = f / pg_phi1 with two multiplies each.
    let mut pg_phi1 = sample::short_sample_plus(g_bytes);
    for i in 0..N {
        pg_phi1.v[i] = pg_phi1.v[i].wrapping_mul(3);
    }
    pg_phi1.mul_x_minus_1();

    let mut pfg_phi1 = poly::mul(&mut scratch, &f, &pg_phi1);
    let mut pfg_phi1_inverse = poly::invert(&mut scratch, &pfg_phi1);

    let mut ph = poly::mul(&mut scratch, &pfg_phi1_inverse, &pg_phi1);
    ph = poly::mul(&mut scratch, &ph, &pg_phi1);
    ph.clamp();

    let mut ph_inverse = poly::mul(&mut scratch, &pfg_phi1_inverse, &f);
    ph_inverse = poly::mul(&mut scratch, &ph_inverse, &f);
    ph_inverse.clamp();

    f.zeroize();
    pg_phi1.zeroize();
    pfg_phi1.zeroize();
    pfg_phi1_inverse.zeroize();
    scratch.zeroize();

    (
        PublicKey { ph },
        PrivateKey {
            f: f3,
            f_inverse: f3_inverse,
            ph_inverse,
            hmac_key,
        },
    )
}

/// Generate a keypair from `rng`.
pub fn keypair(rng: &mut impl CryptoRng) -> (PublicKey, PrivateKey) {
    let mut input = [0u8; GENERATE_BYTES];
    rng.fill_bytes(&mut input);
    let out = keypair_derand(&input);
    input.zeroize();
    out
}

/// Deterministic encapsulation from `ENCAP_BYTES` of entropy: one sample
/// block each for the message m and the blinding polynomial r.
pub fn encapsulate_derand(
    public_key: &PublicKey,
    input: &[u8; ENCAP_BYTES],
) -> (Ciphertext, SharedSecret) {
    let mut scratch = MulScratch::default();

    let m_bytes_in: &[u8; SAMPLE_BYTES] = input[..SAMPLE_BYTES].try_into().unwrap();
    let r_bytes_in: &[u8; SAMPLE_BYTES] = input[SAMPLE_BYTES..].try_into().unwrap();
    let m = sample::short_sample(m_bytes_in);
    let r = sample::short_sample(r_bytes_in);
    let m_lifted = lift::lift(&m);

    let mut prh_plus_m = poly::mul(&mut scratch, &r, &public_key.ph);
    for i in 0..N {
        prh_plus_m.v[i] = prh_plus_m.v[i].wrapping_add(m_lifted.v[i]);
    }

    let ciphertext = pack::marshal(&prh_plus_m);
    let m_bytes = pack::marshal_mod3(&m);
    let r_bytes = pack::marshal_mod3(&r);
    let key = hash::shared_key(&m_bytes, &r_bytes, &ciphertext);

    (Ciphertext(ciphertext), SharedSecret(key))
}

/// Encapsulate to `public_key` using `rng`.
pub fn encapsulate(
    public_key: &PublicKey,
    rng: &mut impl CryptoRng,
) -> (Ciphertext, SharedSecret) {
    let mut input = [0u8; ENCAP_BYTES];
    rng.fill_bytes(&mut input);
    let out = encapsulate_derand(public_key, &input);
    input.zeroize();
    out
}

/// Decapsulate `ciphertext`, which may be of any length and any content;
/// anything that is not an honest encapsulation to this key yields the
/// implicit-rejection key instead.
pub fn decapsulate(private_key: &PrivateKey, ciphertext: &[u8]) -> SharedSecret {
    // The rejection key is derived first and unconditionally; the success
    // path overwrites it with a constant-time move at the very end.
    let mut key = hash::rejection_key(&private_key.hmac_key, ciphertext);

    let Ok(ciphertext) = <&[u8; CIPHERTEXT_BYTES]>::try_from(ciphertext) else {
        return SharedSecret(key);
    };
    let Some(c) = pack::unmarshal(ciphertext) else {
        return SharedSecret(key);
    };

    let mut scratch = MulScratch::default();

    // m = (c * f mod 3) * f^-1 mod (3, Phi(N)). cf is not reduced mod
    // Phi(N) first; the ternary multiply performs that reduction itself.
    let mut f = Poly::from_poly3(&private_key.f);
    let mut cf = poly::mul(&mut scratch, &c, &f);
    let mut cf3 = cf.to_poly3();
    let mut m3 = poly3::mul(&cf3, &private_key.f_inverse);
    let mut m = Poly::from_poly3(&m3);

    // r = (c - lift(m)) / h.
    let mut m_lifted = lift::lift(&m);
    let mut r = Poly::zero();
    for i in 0..N {
        r.v[i] = c.v[i].wrapping_sub(m_lifted.v[i]);
    }
    r = poly::mul(&mut scratch, &r, &private_key.ph_inverse);
    r.mod_phi_n();
    r.clamp();

    // An honest ciphertext satisfies two checks: r is ternary, and the
    // canonical re-encoding of c equals the ciphertext bytes received.
    // Given both, re-encrypting (m, r) would reproduce c exactly, so the
    // second multiplication of an explicit re-encryption is unnecessary.
    let (mut r3, mut ok) = r.to_poly3_checked();
    let expected_ciphertext = pack::marshal(&c);
    ok &= ct::is_zero_mask(ct::ct_verify(ciphertext, &expected_ciphertext) as u64);

    let m_bytes = pack::marshal_mod3(&m);
    let r_bytes = pack::marshal_mod3(&r);
    let real_key = hash::shared_key(&m_bytes, &r_bytes, &expected_ciphertext);
    ct::ct_cmov(&mut key, &real_key, (ok & 1) as u8);

    f.zeroize();
    cf.zeroize();
    cf3.zeroize();
    m3.zeroize();
    m.zeroize();
    m_lifted.zeroize();
    r.zeroize();
    r3.zeroize();
    scratch.zeroize();

    SharedSecret(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{POLY_BYTES, PUBLIC_KEY_BYTES};

    fn next(state: &mut u64) -> u64 {
        *state ^= *state << 13;
        *state ^= *state >> 7;
        *state ^= *state << 17;
        *state
    }

    fn keypair_from_seed(state: &mut u64) -> (PublicKey, PrivateKey) {
        let input: [u8; GENERATE_BYTES] = core::array::from_fn(|_| next(state) as u8);
        keypair_derand(&input)
    }

    #[test]
    fn agreement() {
        let mut state = 0x853c_49e6_748f_ea9bu64;
        let (pk, sk) = keypair_from_seed(&mut state);

        for _ in 0..8 {
            let input: [u8; ENCAP_BYTES] = core::array::from_fn(|_| next(&mut state) as u8);
            let (ct, k1) = encapsulate_derand(&pk, &input);
            let k2 = decapsulate(&sk, ct.as_bytes());
            assert_eq!(k1.as_bytes(), k2.as_bytes());
        }
    }

    #[test]
    fn derand_is_deterministic() {
        let mut state = 0xda3e_39cb_94b9_5bdbu64;
        let input: [u8; GENERATE_BYTES] = core::array::from_fn(|_| next(&mut state) as u8);
        let (pk1, _) = keypair_derand(&input);
        let (pk2, _) = keypair_derand(&input);
        assert_eq!(pk1.to_bytes(), pk2.to_bytes());

        let enc_input: [u8; ENCAP_BYTES] = core::array::from_fn(|_| next(&mut state) as u8);
        let (ct1, k1) = encapsulate_derand(&pk1, &enc_input);
        let (ct2, k2) = encapsulate_derand(&pk2, &enc_input);
        assert_eq!(ct1, ct2);
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn corrupt_ciphertext_is_implicitly_rejected() {
        let mut state = 0xc4ce_b9fe_1a85_ec53u64;
        let (pk, sk) = keypair_from_seed(&mut state);
        let input: [u8; ENCAP_BYTES] = core::array::from_fn(|_| next(&mut state) as u8);
        let (ct, key) = encapsulate_derand(&pk, &input);

        for bit in [0usize, 7, 1000, 13 * 8 * 50 + 3, POLY_BYTES * 8 - 5] {
            let mut bad = *ct.as_bytes();
            bad[bit / 8] ^= 1 << (bit % 8);
            let rejected = decapsulate(&sk, &bad);
            assert_ne!(key.as_bytes(), rejected.as_bytes(), "bit {bit}");
            assert_eq!(
                rejected.as_bytes(),
                &hash::rejection_key(&sk.hmac_key, &bad),
            );
        }
    }

    #[test]
    fn wrong_length_ciphertext_is_implicitly_rejected() {
        let mut state = 0x2545_f491_4f6c_dd1du64;
        let (_, sk) = keypair_from_seed(&mut state);

        for len in [0usize, 1, CIPHERTEXT_BYTES - 1, CIPHERTEXT_BYTES + 1] {
            let ct = vec![0xa5u8; len];
            let got = decapsulate(&sk, &ct);
            assert_eq!(got.as_bytes(), &hash::rejection_key(&sk.hmac_key, &ct));
        }
    }

    #[test]
    fn non_canonical_ciphertext_is_implicitly_rejected() {
        let mut state = 0x9e6c_63d0_876a_73ecu64;
        let (pk, sk) = keypair_from_seed(&mut state);
        let input: [u8; ENCAP_BYTES] = core::array::from_fn(|_| next(&mut state) as u8);
        let (ct, key) = encapsulate_derand(&pk, &input);

        // Setting a reserved bit fails unmarshalling outright.
        let mut bad = *ct.as_bytes();
        bad[CIPHERTEXT_BYTES - 1] |= 0xf0;
        let rejected = decapsulate(&sk, &bad);
        assert_ne!(key.as_bytes(), rejected.as_bytes());
        assert_eq!(rejected.as_bytes(), &hash::rejection_key(&sk.hmac_key, &bad));
    }

    #[test]
    fn public_key_survives_serialisation() {
        let mut state = 0x1615_7e2b_a4d6_4b41u64;
        let (pk, sk) = keypair_from_seed(&mut state);
        let pk2 = PublicKey::from_bytes(&pk.to_bytes()).unwrap();
        assert_eq!(pk.to_bytes().len(), PUBLIC_KEY_BYTES);

        let input: [u8; ENCAP_BYTES] = core::array::from_fn(|_| next(&mut state) as u8);
        let (ct, k1) = encapsulate_derand(&pk2, &input);
        let k2 = decapsulate(&sk, ct.as_bytes());
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }
}
