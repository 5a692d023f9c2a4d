use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaperbackError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid threshold: k={k}, n={n}. Must satisfy 1 <= k <= n <= 255")]
    InvalidThreshold { k: usize, n: usize },

    #[error("Secret must not be empty")]
    EmptySecret,

    #[error("Insufficient shares: have {have}, need at least {need}")]
    InsufficientShares { have: usize, need: usize },

    #[error("Mismatched shares: {0}")]
    MismatchedShares(String),

    #[error("Division by zero in GF(256)")]
    DivideByZero,

    #[error("Invalid chunk width: {0}. Must be between 1 and 64 bits")]
    InvalidWidth(usize),

    #[error("Invalid chunk: {0}")]
    InvalidChunk(String),

    #[error("Shard decryption failed: wrong codeword or corrupted shard")]
    ShardDecryptionFailed,

    #[error("Master decryption failed: shares do not reconstruct the passphrase")]
    MasterDecryptionFailed,

    #[error("No unused share indices available (all 255 are taken)")]
    NoAvailableIndices,

    #[error("Invalid codeword: {0}")]
    InvalidCodeword(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Compression error: {0}")]
    CompressionError(String),

    #[error("Decompression error: {0}")]
    DecompressionError(String),

    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Random source failed: {0}")]
    RandomSourceFailed(String),
}

impl PaperbackError {
    /// Whether adding more shards and calling `recover` again may succeed
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientShares { .. } | Self::MasterDecryptionFailed
        )
    }
}

pub type Result<T> = std::result::Result<T, PaperbackError>;
