//! (k, n)-threshold secret sharing over GF(2^8).
//!
//! Every byte of the secret is shared independently on its own random
//! polynomial; a share is the vector of all those polynomials evaluated at
//! one non-zero x.
//!
//! **Not constant time.** The field uses table lookups indexed by secret
//! bytes.

mod dealer;
mod gf;
mod poly;
mod share;

pub use dealer::{combine, extend_shares, split, MAX_SHARES, MIN_COMBINE};
pub use share::{Generation, Share};
