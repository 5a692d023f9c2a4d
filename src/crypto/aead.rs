use crate::error::{PaperbackError, Result};
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::{rngs::OsRng, RngCore};
use zeroize::Zeroizing;

pub const NONCE_SIZE: usize = 12;
pub const TAG_SIZE: usize = 16;

/// What a sealed blob protects
///
/// Each purpose derives its own key and binds its own label into the
/// associated data, so a shard ciphertext never opens as a master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPurpose {
    Master,
    Shard,
}

impl KeyPurpose {
    fn context(&self) -> &'static str {
        match self {
            Self::Master => "paperback 2024-01 master document key",
            Self::Shard => "paperback 2024-01 key shard key",
        }
    }

    fn label(&self) -> &'static [u8] {
        match self {
            Self::Master => b"paperback:master:v1",
            Self::Shard => b"paperback:shard:v1",
        }
    }
}

/// Derive the AES-256 key for `purpose` from a high-entropy secret
fn derive_key(purpose: KeyPurpose, secret: &[u8]) -> Zeroizing<[u8; 32]> {
    Zeroizing::new(blake3::derive_key(purpose.context(), secret))
}

fn associated_data(purpose: KeyPurpose, aad: &[u8]) -> Vec<u8> {
    let label = purpose.label();
    let mut full = Vec::with_capacity(label.len() + aad.len());
    full.extend_from_slice(label);
    full.extend_from_slice(aad);
    full
}

/// Encrypt with AES-256-GCM
/// Output format: nonce(12) || ciphertext || tag(16)
pub fn seal(secret: &[u8], purpose: KeyPurpose, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let key = derive_key(purpose, secret);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng
        .try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| PaperbackError::RandomSourceFailed(e.to_string()))?;

    let aad = associated_data(purpose, aad);
    let ciphertext = cipher
        .encrypt(
            Nonce::from_slice(&nonce_bytes),
            Payload {
                msg: plaintext,
                aad: &aad,
            },
        )
        .map_err(|_| PaperbackError::EncryptionFailed)?;

    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);
    Ok(sealed)
}

/// Decrypt and authenticate; `None` on any failure
pub fn open(
    secret: &[u8],
    purpose: KeyPurpose,
    aad: &[u8],
    sealed: &[u8],
) -> Option<Zeroizing<Vec<u8>>> {
    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return None;
    }

    let key = derive_key(purpose, secret);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key[..]));
    let (nonce, ciphertext) = sealed.split_at(NONCE_SIZE);

    let aad = associated_data(purpose, aad);
    cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad: &aad,
            },
        )
        .ok()
        .map(Zeroizing::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_seal_open_roundtrip() {
        let sealed = seal(KEY, KeyPurpose::Master, b"hdr", b"document").unwrap();
        assert_eq!(sealed.len(), NONCE_SIZE + 8 + TAG_SIZE);
        let opened = open(KEY, KeyPurpose::Master, b"hdr", &sealed).unwrap();
        assert_eq!(&opened[..], b"document");
    }

    #[test]
    fn test_fresh_nonce_per_seal() {
        let a = seal(KEY, KeyPurpose::Shard, b"", b"same").unwrap();
        let b = seal(KEY, KeyPurpose::Shard, b"", b"same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_open_rejects_wrong_key() {
        let sealed = seal(KEY, KeyPurpose::Shard, b"", b"share").unwrap();
        assert!(open(b"another key", KeyPurpose::Shard, b"", &sealed).is_none());
    }

    #[test]
    fn test_open_rejects_tampering() {
        let sealed = seal(KEY, KeyPurpose::Shard, b"", b"share bytes").unwrap();
        for i in 0..sealed.len() {
            let mut bad = sealed.clone();
            bad[i] ^= 0x01;
            assert!(open(KEY, KeyPurpose::Shard, b"", &bad).is_none(), "byte {}", i);
        }
        assert!(open(KEY, KeyPurpose::Shard, b"", &sealed[..NONCE_SIZE]).is_none());
    }

    #[test]
    fn test_purposes_do_not_cross() {
        let sealed = seal(KEY, KeyPurpose::Shard, b"", b"share").unwrap();
        assert!(open(KEY, KeyPurpose::Master, b"", &sealed).is_none());
    }

    #[test]
    fn test_associated_data_is_bound() {
        let sealed = seal(KEY, KeyPurpose::Master, &[1], b"doc").unwrap();
        assert!(open(KEY, KeyPurpose::Master, &[2], &sealed).is_none());
    }
}
