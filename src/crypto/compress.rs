use crate::config::Compression;
use crate::error::{PaperbackError, Result};
use std::io::{Read, Write};
use zeroize::Zeroizing;

/// Compress a document with the specified algorithm
pub fn compress(data: &[u8], algorithm: Compression) -> Result<Zeroizing<Vec<u8>>> {
    let out = match algorithm {
        Compression::Zstd => compress_zstd(data)?,
        Compression::Lz4 => lz4_flex::compress_prepend_size(data),
        Compression::Brotli => compress_brotli(data)?,
        Compression::None => data.to_vec(),
    };
    Ok(Zeroizing::new(out))
}

/// Decompress a document with the specified algorithm
pub fn decompress(data: &[u8], algorithm: Compression) -> Result<Zeroizing<Vec<u8>>> {
    let out = match algorithm {
        Compression::Zstd => zstd::decode_all(data)
            .map_err(|e| PaperbackError::DecompressionError(format!("zstd: {}", e)))?,
        Compression::Lz4 => lz4_flex::decompress_size_prepended(data)
            .map_err(|e| PaperbackError::DecompressionError(format!("lz4: {}", e)))?,
        Compression::Brotli => decompress_brotli(data)?,
        Compression::None => data.to_vec(),
    };
    Ok(Zeroizing::new(out))
}

fn compress_zstd(data: &[u8]) -> Result<Vec<u8>> {
    zstd::encode_all(data, 19)
        .map_err(|e| PaperbackError::CompressionError(format!("zstd: {}", e)))
}

fn compress_brotli(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    {
        let mut writer = brotli::CompressorWriter::new(&mut output, 4096, 11, 22);
        writer
            .write_all(data)
            .map_err(|e| PaperbackError::CompressionError(format!("brotli: {}", e)))?;
    }
    Ok(output)
}

fn decompress_brotli(data: &[u8]) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    brotli::Decompressor::new(data, 4096)
        .read_to_end(&mut output)
        .map_err(|e| PaperbackError::DecompressionError(format!("brotli: {}", e)))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Compression; 4] = [
        Compression::Zstd,
        Compression::Lz4,
        Compression::Brotli,
        Compression::None,
    ];

    #[test]
    fn test_document_roundtrip() {
        let doc = b"Recovery codes:\n  1. alpha\n  2. bravo\n  3. charlie\n".repeat(20);
        for alg in ALL {
            let packed = compress(&doc, alg).unwrap();
            assert_eq!(&*decompress(&packed, alg).unwrap(), &doc[..], "{:?}", alg);
        }
    }

    #[test]
    fn test_compression_shrinks_text() {
        let doc = b"the same line over and over\n".repeat(100);
        for alg in [Compression::Zstd, Compression::Lz4, Compression::Brotli] {
            assert!(compress(&doc, alg).unwrap().len() < doc.len(), "{:?}", alg);
        }
    }

    #[test]
    fn test_empty_document() {
        for alg in ALL {
            let packed = compress(b"", alg).unwrap();
            assert!(decompress(&packed, alg).unwrap().is_empty());
        }
    }

    #[test]
    fn test_garbage_fails_to_decompress() {
        assert!(decompress(&[0xFF; 32], Compression::Zstd).is_err());
        // 16-byte size prefix followed by a literal run that overruns the input
        assert!(decompress(&[0x10, 0, 0, 0, 0xFF, 0xFF, 0xFF], Compression::Lz4).is_err());
    }
}
