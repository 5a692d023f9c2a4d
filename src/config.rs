use crate::error::{PaperbackError, Result};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Compression applied to the document before it is sealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Zstd,
    Lz4,
    Brotli,
    None,
}

impl Compression {
    /// Stable tag bound into the master's associated data
    pub fn tag(&self) -> u8 {
        match self {
            Self::None => 0,
            Self::Zstd => 1,
            Self::Lz4 => 2,
            Self::Brotli => 3,
        }
    }
}

impl std::str::FromStr for Compression {
    type Err = PaperbackError;
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zstd" => Ok(Self::Zstd),
            "lz4" => Ok(Self::Lz4),
            "brotli" => Ok(Self::Brotli),
            "none" => Ok(Self::None),
            _ => Err(PaperbackError::UnsupportedAlgorithm(format!(
                "compression: {}",
                s
            ))),
        }
    }
}

/// Parameters for creating a backup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackupConfig {
    /// Master passphrase length in bytes
    pub passphrase_len: usize,
    /// Per-shard codeword length in bytes
    pub codeword_len: usize,
    /// Compression for the document plaintext
    pub compression: Compression,
}

impl BackupConfig {
    pub const PASSPHRASE_LEN: RangeInclusive<usize> = 16..=64;
    pub const CODEWORD_LEN: RangeInclusive<usize> = 8..=32;

    pub fn validate(&self) -> Result<()> {
        if !Self::PASSPHRASE_LEN.contains(&self.passphrase_len) {
            return Err(PaperbackError::InvalidConfig(format!(
                "passphrase_len {} outside {:?}",
                self.passphrase_len,
                Self::PASSPHRASE_LEN
            )));
        }
        if !Self::CODEWORD_LEN.contains(&self.codeword_len) {
            return Err(PaperbackError::InvalidConfig(format!(
                "codeword_len {} outside {:?}",
                self.codeword_len,
                Self::CODEWORD_LEN
            )));
        }
        Ok(())
    }

    /// Parse from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            passphrase_len: 32,
            codeword_len: 16,
            compression: Compression::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_from_str() {
        assert_eq!("ZSTD".parse::<Compression>().unwrap(), Compression::Zstd);
        assert_eq!("lz4".parse::<Compression>().unwrap(), Compression::Lz4);
        assert_eq!("Brotli".parse::<Compression>().unwrap(), Compression::Brotli);
        assert_eq!("none".parse::<Compression>().unwrap(), Compression::None);
        assert!(matches!(
            "gzip".parse::<Compression>(),
            Err(PaperbackError::UnsupportedAlgorithm(_))
        ));
    }

    #[test]
    fn test_default_config_is_valid() {
        BackupConfig::default().validate().unwrap();
    }

    #[test]
    fn test_validate_bounds() {
        let short = BackupConfig {
            passphrase_len: 8,
            ..Default::default()
        };
        assert!(matches!(short.validate(), Err(PaperbackError::InvalidConfig(_))));

        let long = BackupConfig {
            codeword_len: 33,
            ..Default::default()
        };
        assert!(matches!(long.validate(), Err(PaperbackError::InvalidConfig(_))));
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = BackupConfig::from_json(r#"{"compression": "lz4"}"#).unwrap();
        assert_eq!(config.compression, Compression::Lz4);
        assert_eq!(config.passphrase_len, 32);

        assert!(BackupConfig::from_json(r#"{"codeword_len": 2}"#).is_err());
    }
}
