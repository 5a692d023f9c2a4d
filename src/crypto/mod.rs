//! Collaborators around the sharing engine: authenticated encryption,
//! document compression and random secret generation.

pub mod aead;
pub mod compress;
pub mod phrase;

pub use aead::{open, seal, KeyPurpose};
pub use compress::{compress, decompress};
pub use phrase::{Codeword, Passphrase};
