//! NTRU-HRSS-701 key encapsulation.
//!
//! The HRSS-SXY variant of NTRU-HRSS: a correct (failure-free) lattice
//! KEM over Z_8192[x]/(x^701 - 1) with implicit rejection, as used for
//! post-quantum TLS experiments. Every secret-dependent computation is
//! constant time: polynomial arithmetic is bit-sliced or branchless,
//! inversions run a fixed iteration count, and decapsulation derives a
//! pseudorandom rejection key for invalid ciphertexts instead of
//! returning an error.
//!
//! ```
//! use rand_core::SeedableRng;
//!
//! // Any CryptoRng works; seed from the OS in production.
//! let mut rng = rand_chacha::ChaCha20Rng::from_seed([7u8; 32]);
//! let (public_key, private_key) = hrss::keypair(&mut rng);
//!
//! let (ciphertext, sender_key) = hrss::encapsulate(&public_key, &mut rng);
//! let receiver_key = hrss::decapsulate(&private_key, ciphertext.as_bytes());
//!
//! assert_eq!(sender_key.as_bytes(), receiver_key.as_bytes());
//! ```

#![deny(unsafe_code)]

pub(crate) mod ct;
mod hash;
mod kem;
pub mod math;
pub mod params;
mod types;

pub use kem::{decapsulate, encapsulate, encapsulate_derand, keypair, keypair_derand};
pub use params::{CIPHERTEXT_BYTES, ENCAP_BYTES, GENERATE_BYTES, KEY_BYTES, PUBLIC_KEY_BYTES};
pub use types::{Ciphertext, PrivateKey, PublicKey, SharedSecret};

/// Errors from parsing wire-format inputs.
///
/// Decapsulation deliberately has no error path; this type covers only
/// explicit parsing entry points such as [`PublicKey::from_bytes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The input slice has the wrong length.
    InvalidLength,
    /// The input is not a canonical encoding.
    Malformed,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::InvalidLength => f.write_str("input has the wrong length"),
            Error::Malformed => f.write_str("input is not a canonical encoding"),
        }
    }
}

impl core::error::Error for Error {}
