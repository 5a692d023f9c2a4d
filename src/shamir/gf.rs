//! GF(2^8) arithmetic over x^8 + x^4 + x^3 + x + 1 (0x11B).
//!
//! Multiplication and division go through log/antilog tables built once on
//! first use. Table lookups are indexed by secret values, so this is not
//! constant time with respect to cache behaviour.

use crate::error::{PaperbackError, Result};
use std::sync::OnceLock;

/// Reduction term of the field polynomial with the x^8 bit dropped
const POLY: u8 = 0x1B;

/// 0x03 generates the multiplicative group under 0x11B
const GENERATOR: u8 = 0x03;

/// Order of the multiplicative group
const ORDER: usize = 255;

struct Tables {
    /// exp[i] = g^i, doubled so log sums need no reduction
    exp: [u8; 2 * ORDER],
    /// log[x] = i such that g^i = x; log[0] is unused
    log: [u8; 256],
}

impl Tables {
    fn build() -> Self {
        let mut exp = [0u8; 2 * ORDER];
        let mut log = [0u8; 256];

        let mut x: u8 = 1;
        for (i, slot) in exp.iter_mut().take(ORDER).enumerate() {
            *slot = x;
            log[x as usize] = i as u8;
            x = mul_slow(x, GENERATOR);
        }
        for i in ORDER..2 * ORDER {
            exp[i] = exp[i - ORDER];
        }

        Self { exp, log }
    }
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(Tables::build)
}

/// Shift-and-add multiply, only used to seed the tables
fn mul_slow(mut a: u8, mut b: u8) -> u8 {
    let mut r = 0u8;
    while b != 0 {
        if b & 1 != 0 {
            r ^= a;
        }
        let carry = a & 0x80 != 0;
        a <<= 1;
        if carry {
            a ^= POLY;
        }
        b >>= 1;
    }
    r
}

#[inline]
pub fn add(a: u8, b: u8) -> u8 {
    a ^ b
}

/// Same as add in characteristic 2
#[inline]
pub fn sub(a: u8, b: u8) -> u8 {
    a ^ b
}

#[inline]
pub fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let t = tables();
    t.exp[t.log[a as usize] as usize + t.log[b as usize] as usize]
}

pub fn div(a: u8, b: u8) -> Result<u8> {
    if b == 0 {
        return Err(PaperbackError::DivideByZero);
    }
    if a == 0 {
        return Ok(0);
    }
    let t = tables();
    Ok(t.exp[t.log[a as usize] as usize + ORDER - t.log[b as usize] as usize])
}

pub fn inverse(a: u8) -> Result<u8> {
    div(1, a)
}
