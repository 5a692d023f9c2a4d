use super::poly::{evaluate, interpolate, lagrange_basis, lagrange_weights};
use super::share::{Generation, Share};
use super::gf;
use crate::error::{PaperbackError, Result};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashSet;
use tracing::debug;
use zeroize::Zeroizing;

/// Largest usable ShareIndex (0 is the secret itself)
pub const MAX_SHARES: usize = 255;

/// Fewest shares `combine` will interpolate
pub const MIN_COMBINE: usize = 2;

/// Split `secret` into `n` shares, any `k` of which reconstruct it
///
/// Each byte of the secret is the constant term of its own degree-(k-1)
/// polynomial with uniformly random higher coefficients. Share `i` holds
/// every polynomial evaluated at x = i, for i in 1..=n.
pub fn split(k: usize, n: usize, secret: &[u8]) -> Result<Vec<Share>> {
    if k == 0 || k > n || n > MAX_SHARES {
        return Err(PaperbackError::InvalidThreshold { k, n });
    }
    if secret.is_empty() {
        return Err(PaperbackError::EmptySecret);
    }

    let generation = Generation::random()?;
    let degree = k - 1;

    // One row per byte position: [secret_byte, c_1, ..., c_{k-1}]
    let mut coeffs = Zeroizing::new(vec![0u8; secret.len() * k]);
    let mut random = Zeroizing::new(vec![0u8; secret.len() * degree]);
    OsRng
        .try_fill_bytes(&mut random)
        .map_err(|e| PaperbackError::RandomSourceFailed(e.to_string()))?;

    for (pos, row) in coeffs.chunks_exact_mut(k).enumerate() {
        row[0] = secret[pos];
        row[1..].copy_from_slice(&random[pos * degree..(pos + 1) * degree]);
    }

    let shares = (1..=n as u8)
        .map(|x| Share {
            generation,
            threshold: k as u8,
            issued: n as u8,
            x,
            ys: coeffs.chunks_exact(k).map(|row| evaluate(row, x)).collect(),
        })
        .collect();

    debug!(k, n, len = secret.len(), %generation, "split secret");
    Ok(shares)
}

/// Reconstruct the secret from shares by interpolating at x = 0
///
/// The result is only the original secret if at least `k` genuine shares
/// of the same generation are present; fewer yield an unrelated value that
/// must be caught by whatever authenticates the secret downstream.
pub fn combine(shares: &[Share]) -> Result<Zeroizing<Vec<u8>>> {
    if shares.len() < MIN_COMBINE {
        return Err(PaperbackError::InsufficientShares {
            have: shares.len(),
            need: MIN_COMBINE,
        });
    }
    check_consistent(shares)?;

    let xs: Vec<u8> = shares.iter().map(|s| s.x).collect();
    let weights = lagrange_weights(&xs, 0)?;

    let len = shares[0].ys.len();
    let mut secret = Zeroizing::new(vec![0u8; len]);
    for (pos, byte) in secret.iter_mut().enumerate() {
        *byte = shares
            .iter()
            .zip(weights.iter())
            .fold(0u8, |acc, (share, &w)| gf::add(acc, gf::mul(w, share.ys[pos])));
    }

    debug!(shares = shares.len(), len, "combined shares");
    Ok(secret)
}

/// Issue `count` more shares on the same polynomials as `shares`
///
/// Needs at least `k` consistent shares. The full polynomial for every byte
/// position is rebuilt from all supplied points and evaluated at indices
/// drawn at random from those above the original split's `n` that none of
/// the supplied shares use. Separate extensions (from disjoint quorums, say)
/// therefore rarely pick the same index; holders should still check new
/// shards against the ones they keep. New shares keep the generation,
/// threshold and `issued` of their parents.
pub fn extend_shares(shares: &[Share], count: usize) -> Result<Vec<Share>> {
    let first = shares.first().ok_or(PaperbackError::InsufficientShares { have: 0, need: 1 })?;
    check_consistent(shares)?;

    let k = first.threshold as usize;
    if shares.len() < k {
        return Err(PaperbackError::InsufficientShares {
            have: shares.len(),
            need: k,
        });
    }

    let issued = shares.iter().map(|s| s.issued).max().unwrap_or(0);
    let taken: HashSet<u8> = shares.iter().map(|s| s.x).collect();
    let mut free: Vec<u8> = (issued as usize + 1..=MAX_SHARES)
        .map(|x| x as u8)
        .filter(|x| !taken.contains(x))
        .collect();
    if free.len() < count {
        return Err(PaperbackError::NoAvailableIndices);
    }
    if count == 0 {
        return Ok(Vec::new());
    }
    let indices = pick_indices(&mut free, count)?;

    let xs: Vec<u8> = shares.iter().map(|s| s.x).collect();
    let basis = lagrange_basis(&xs)?;
    let len = first.ys.len();
    let m = shares.len();

    // Rebuilt coefficients per byte position, wiped on drop
    let mut coeffs = Zeroizing::new(vec![0u8; len * m]);
    let mut ys = Zeroizing::new(vec![0u8; m]);
    for (pos, row) in coeffs.chunks_exact_mut(m).enumerate() {
        for (y, share) in ys.iter_mut().zip(shares.iter()) {
            *y = share.ys[pos];
        }
        interpolate(&basis, &ys, row);
    }

    let new_shares: Vec<Share> = indices
        .iter()
        .map(|&x| Share {
            generation: first.generation,
            threshold: first.threshold,
            issued,
            x,
            ys: coeffs.chunks_exact(m).map(|row| evaluate(row, x)).collect(),
        })
        .collect();

    debug!(
        from = m,
        count,
        free = free.len() + count,
        generation = %first.generation,
        "extended shares"
    );
    Ok(new_shares)
}

/// Remove `count` uniformly chosen entries from `free`, returned ascending
fn pick_indices(free: &mut Vec<u8>, count: usize) -> Result<Vec<u8>> {
    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        let mut buf = [0u8; 8];
        OsRng
            .try_fill_bytes(&mut buf)
            .map_err(|e| PaperbackError::RandomSourceFailed(e.to_string()))?;
        // At most 255 candidates, so the modulo bias is below 2^-56
        let i = (u64::from_le_bytes(buf) % free.len() as u64) as usize;
        picked.push(free.swap_remove(i));
    }
    picked.sort_unstable();
    Ok(picked)
}

/// Shares must agree on generation, threshold and length, with distinct non-zero x
fn check_consistent(shares: &[Share]) -> Result<()> {
    let Some(first) = shares.first() else {
        return Ok(());
    };
    let mut seen = HashSet::with_capacity(shares.len());

    for share in shares {
        if share.x == 0 {
            return Err(PaperbackError::MismatchedShares(
                "share index 0 is reserved for the secret".into(),
            ));
        }
        if !seen.insert(share.x) {
            return Err(PaperbackError::MismatchedShares(format!(
                "duplicate share index {}",
                share.x
            )));
        }
        if share.ys.len() != first.ys.len() {
            return Err(PaperbackError::MismatchedShares(format!(
                "share {} has length {}, expected {}",
                share.x,
                share.ys.len(),
                first.ys.len()
            )));
        }
        if share.generation != first.generation {
            return Err(PaperbackError::MismatchedShares(format!(
                "share {} is from generation {}, expected {}",
                share.x, share.generation, first.generation
            )));
        }
        if share.threshold != first.threshold {
            return Err(PaperbackError::MismatchedShares(format!(
                "share {} has threshold {}, expected {}",
                share.x, share.threshold, first.threshold
            )));
        }
    }
    Ok(())
}
