//! Polynomial evaluation and Lagrange interpolation over GF(2^8).
//!
//! Coefficient vectors are stored lowest degree first.

use super::gf;
use crate::error::Result;

/// Evaluate a polynomial at `x` using Horner's method
pub fn evaluate(coeffs: &[u8], x: u8) -> u8 {
    coeffs
        .iter()
        .rev()
        .fold(0u8, |acc, &c| gf::add(gf::mul(acc, x), c))
}

/// Lagrange weights for evaluating the interpolant of `xs` at `target`
///
/// `p(target) = sum(w_i * y_i)`. The weights only depend on the x-coordinates,
/// so they are computed once and reused for every byte position.
pub fn lagrange_weights(xs: &[u8], target: u8) -> Result<Vec<u8>> {
    xs.iter()
        .enumerate()
        .map(|(i, &xi)| {
            let mut num = 1u8;
            let mut den = 1u8;
            for (j, &xj) in xs.iter().enumerate() {
                if i == j {
                    continue;
                }
                num = gf::mul(num, gf::sub(target, xj));
                den = gf::mul(den, gf::sub(xi, xj));
            }
            gf::div(num, den)
        })
        .collect()
}

/// Lagrange basis polynomials for `xs`
///
/// `basis[i]` is 1 at `xs[i]` and 0 at every other x, so the full
/// interpolating polynomial is `sum(y_i * basis[i])`.
pub fn lagrange_basis(xs: &[u8]) -> Result<Vec<Vec<u8>>> {
    xs.iter()
        .enumerate()
        .map(|(i, &xi)| {
            let mut poly = vec![1u8];
            let mut den = 1u8;
            for (j, &xj) in xs.iter().enumerate() {
                if i == j {
                    continue;
                }
                // poly *= (x - xj)
                let mut next = vec![0u8; poly.len() + 1];
                for (d, &c) in poly.iter().enumerate() {
                    next[d + 1] = gf::add(next[d + 1], c);
                    next[d] = gf::add(next[d], gf::mul(c, xj));
                }
                poly = next;
                den = gf::mul(den, gf::sub(xi, xj));
            }
            let scale = gf::inverse(den)?;
            for c in poly.iter_mut() {
                *c = gf::mul(*c, scale);
            }
            Ok(poly)
        })
        .collect()
}

/// Combine basis polynomials with y-values into one coefficient vector
pub fn interpolate(basis: &[Vec<u8>], ys: &[u8], out: &mut [u8]) {
    out.iter_mut().for_each(|c| *c = 0);
    for (poly, &y) in basis.iter().zip(ys.iter()) {
        for (c, &b) in out.iter_mut().zip(poly.iter()) {
            *c = gf::add(*c, gf::mul(y, b));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaperbackError;

    #[test]
    fn test_evaluate_constant_term() {
        let coeffs = [0x42, 0x13, 0x99];
        assert_eq!(evaluate(&coeffs, 0), 0x42);
        assert_eq!(evaluate(&[], 5), 0);
    }

    #[test]
    fn test_evaluate_matches_naive() {
        let coeffs = [0x10, 0x20, 0x30, 0x40];
        for x in 0..=255u8 {
            let mut expected = 0u8;
            let mut power = 1u8;
            for &c in &coeffs {
                expected = gf::add(expected, gf::mul(c, power));
                power = gf::mul(power, x);
            }
            assert_eq!(evaluate(&coeffs, x), expected);
        }
    }

    #[test]
    fn test_weights_recover_constant_term() {
        let coeffs = [0xAB, 0x05, 0x77];
        let xs = [3u8, 9, 200];
        let ys: Vec<u8> = xs.iter().map(|&x| evaluate(&coeffs, x)).collect();
        let weights = lagrange_weights(&xs, 0).unwrap();
        let value = weights
            .iter()
            .zip(ys.iter())
            .fold(0u8, |acc, (&w, &y)| gf::add(acc, gf::mul(w, y)));
        assert_eq!(value, 0xAB);
    }

    #[test]
    fn test_basis_recovers_all_coefficients() {
        let coeffs = [0x01, 0xFE, 0x33, 0x80];
        let xs = [1u8, 2, 3, 4];
        let ys: Vec<u8> = xs.iter().map(|&x| evaluate(&coeffs, x)).collect();
        let basis = lagrange_basis(&xs).unwrap();
        let mut out = vec![0u8; xs.len()];
        interpolate(&basis, &ys, &mut out);
        assert_eq!(out, coeffs);
    }

    #[test]
    fn test_extra_points_give_zero_high_terms() {
        let coeffs = [0x5A, 0xC3];
        let xs = [7u8, 8, 9, 10];
        let ys: Vec<u8> = xs.iter().map(|&x| evaluate(&coeffs, x)).collect();
        let basis = lagrange_basis(&xs).unwrap();
        let mut out = vec![0u8; xs.len()];
        interpolate(&basis, &ys, &mut out);
        assert_eq!(out, vec![0x5A, 0xC3, 0, 0]);
    }

    #[test]
    fn test_duplicate_x_is_divide_by_zero() {
        assert!(matches!(
            lagrange_weights(&[4, 4], 0),
            Err(PaperbackError::DivideByZero)
        ));
        assert!(matches!(
            lagrange_basis(&[4, 4]),
            Err(PaperbackError::DivideByZero)
        ));
    }
}
