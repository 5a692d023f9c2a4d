use paperback::shamir::{combine, extend_shares, split, Share};
use paperback::PaperbackError;
use proptest::prelude::*;

/// Pick `count` distinct shares in an order given by `seed`
fn pick(shares: &[Share], count: usize, seed: u64) -> Vec<Share> {
    let mut pool: Vec<Share> = shares.to_vec();
    let mut state = seed | 1;
    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        let i = (state % pool.len() as u64) as usize;
        picked.push(pool.remove(i));
    }
    picked
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_k_shares_reconstruct(
        secret in proptest::collection::vec(any::<u8>(), 1..48),
        n in 2usize..12,
        k_seed in any::<usize>(),
        extra in any::<usize>(),
        order in any::<u64>(),
    ) {
        let k = 1 + k_seed % n;
        let shares = split(k, n, &secret).unwrap();
        prop_assert_eq!(shares.len(), n);

        // Combine needs at least two points even when k is 1
        let min = k.max(2);
        let count = min + extra % (n - min + 1);
        let subset = pick(&shares, count, order);
        prop_assert_eq!(&combine(&subset).unwrap()[..], &secret[..]);
    }

    #[test]
    fn fewer_than_k_do_not_reveal(
        secret in proptest::collection::vec(any::<u8>(), 16..32),
        order in any::<u64>(),
    ) {
        // 16+ random bytes: a collision with k-1 shares has negligible probability
        let shares = split(4, 7, &secret).unwrap();
        let subset = pick(&shares, 3, order);
        prop_assert_ne!(&combine(&subset).unwrap()[..], &secret[..]);
    }

    #[test]
    fn extended_shares_interoperate(
        secret in proptest::collection::vec(any::<u8>(), 1..32),
        order in any::<u64>(),
    ) {
        let shares = split(3, 5, &secret).unwrap();
        let parents = pick(&shares, 3, order);
        let extra = extend_shares(&parents, 3).unwrap();
        prop_assert!(extra.iter().all(|s| s.index() > 5));
        prop_assert!(extra.windows(2).all(|w| w[0].index() < w[1].index()));

        let mixed = vec![extra[2].clone(), shares[0].clone(), extra[0].clone()];
        prop_assert_eq!(&combine(&mixed).unwrap()[..], &secret[..]);
    }
}

#[test]
fn test_invalid_parameters() {
    assert!(matches!(
        split(0, 3, b"s"),
        Err(PaperbackError::InvalidThreshold { k: 0, n: 3 })
    ));
    assert!(matches!(
        split(4, 3, b"s"),
        Err(PaperbackError::InvalidThreshold { k: 4, n: 3 })
    ));
    assert!(matches!(
        split(2, 256, b"s"),
        Err(PaperbackError::InvalidThreshold { .. })
    ));
    assert!(matches!(split(2, 3, b""), Err(PaperbackError::EmptySecret)));
}

#[test]
fn test_maximum_share_count() {
    let shares = split(2, 255, b"max").unwrap();
    assert_eq!(shares.last().map(Share::index), Some(255));
    assert_eq!(&*combine(&[shares[0].clone(), shares[254].clone()]).unwrap(), b"max");
}

#[test]
fn test_share_encoding_roundtrip() {
    let shares = split(3, 4, b"encoded secret").unwrap();
    for share in &shares {
        let decoded = Share::from_bytes(&share.to_bytes()).unwrap();
        assert_eq!(&decoded, share);
    }
    assert!(matches!(
        Share::from_bytes(b"PBSx"),
        Err(PaperbackError::InvalidFormat(_))
    ));
}
