//! Public API types.
//!
//! Private keys and shared secrets are wiped on drop. `Debug` never
//! prints key material.

use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::math::{pack, Poly, Poly3};
use crate::params::{CIPHERTEXT_BYTES, KEY_BYTES, PUBLIC_KEY_BYTES};
use crate::Error;

/// An HRSS-701 public (encapsulation) key.
#[derive(Clone)]
pub struct PublicKey {
    pub(crate) ph: Poly,
}

impl PublicKey {
    /// Parse a marshalled public key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let bytes: &[u8; PUBLIC_KEY_BYTES] =
            bytes.try_into().map_err(|_| Error::InvalidLength)?;
        let ph = pack::unmarshal(bytes).ok_or(Error::Malformed)?;
        Ok(PublicKey { ph })
    }

    /// Serialise this key to its wire form.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_BYTES] {
        pack::marshal(&self.ph)
    }
}

impl core::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PublicKey").finish_non_exhaustive()
    }
}

/// An HRSS-701 private (decapsulation) key. Wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    pub(crate) f: Poly3,
    pub(crate) f_inverse: Poly3,
    pub(crate) ph_inverse: Poly,
    pub(crate) hmac_key: [u8; KEY_BYTES],
}

impl core::fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrivateKey").finish_non_exhaustive()
    }
}

/// An HRSS-701 ciphertext.
#[derive(Clone, PartialEq, Eq)]
pub struct Ciphertext(pub(crate) [u8; CIPHERTEXT_BYTES]);

impl Ciphertext {
    #[inline]
    pub fn as_bytes(&self) -> &[u8; CIPHERTEXT_BYTES] {
        &self.0
    }
}

impl AsRef<[u8]> for Ciphertext {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; CIPHERTEXT_BYTES]> for Ciphertext {
    #[inline]
    fn from(bytes: [u8; CIPHERTEXT_BYTES]) -> Self {
        Ciphertext(bytes)
    }
}

impl core::fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Ciphertext")
            .field(&format_args!("[u8; {CIPHERTEXT_BYTES}]"))
            .finish()
    }
}

/// A 32-byte shared secret. Wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SharedSecret(pub(crate) [u8; KEY_BYTES]);

impl SharedSecret {
    #[inline]
    pub fn as_bytes(&self) -> &[u8; KEY_BYTES] {
        &self.0
    }
}

impl core::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("SharedSecret").field(&"[REDACTED]").finish()
    }
}
