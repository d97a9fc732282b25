//! Polynomial arithmetic for the ring Z_q[x]/(x^N - 1) and its mod-2 and
//! mod-3 quotients.
//!
//! Everything here is branchless with respect to secret values: the
//! bit-sliced GF(2)/GF(3) engines and the mod-Q Karatsuba multiplier run
//! the same instruction trace for every input of a given shape.

pub mod lift;
pub mod pack;
pub mod poly;
pub mod poly2;
pub mod poly3;
pub mod sample;

pub use poly::{MulScratch, Poly};
pub use poly2::Poly2;
pub use poly3::Poly3;
