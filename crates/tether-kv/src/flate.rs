//! Payload packing for string-only stores.
//!
//! Binary data is gzipped at best level, since local storage space is
//! small, then encoded as URL-safe base64.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use flate2::Compression;
use flate2::read::{GzDecoder, GzEncoder};
use std::io::{Cursor, Read};

use crate::error::{KvError, KvResult};

/// Gzip some binary data.
pub fn zip<T: AsRef<[u8]>>(data: T) -> KvResult<Vec<u8>> {
    let mut gz = GzEncoder::new(Cursor::new(data.as_ref()), Compression::best());

    let mut out = Vec::new();
    gz.read_to_end(&mut out)
        .map_err(|e| KvError::Codec(format!("gzip: {}", e)))?;
    Ok(out)
}

/// Gzip some binary data, then return it as a `URL_SAFE` base64 string.
pub fn zip64<T: AsRef<[u8]>>(data: T) -> KvResult<String> {
    Ok(URL_SAFE.encode(zip(data)?))
}

/// Unzip gzipped bytes back into the original data.
pub fn unzip<T: AsRef<[u8]>>(zipped: T) -> KvResult<Vec<u8>> {
    let mut gz = GzDecoder::new(Cursor::new(zipped.as_ref()));
    let mut out = Vec::new();
    gz.read_to_end(&mut out)
        .map_err(|e| KvError::Codec(format!("gunzip: {}", e)))?;
    Ok(out)
}

/// Decode a `URL_SAFE` base64 string, then un-gzip it.
pub fn unzip64<T: AsRef<str>>(encoded: T) -> KvResult<Vec<u8>> {
    let zipped = URL_SAFE
        .decode(encoded.as_ref())
        .map_err(|e| KvError::Codec(format!("base64: {}", e)))?;
    unzip(zipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip64_is_url_safe() {
        let data: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let encoded = zip64(&data).unwrap();
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert_eq!(unzip64(&encoded).unwrap(), data);
    }

    #[test]
    fn test_compresses_repetitive_data() {
        let data = vec![b'a'; 10_000];
        assert!(zip(&data).unwrap().len() < 100);
    }

    #[test]
    fn test_bad_input() {
        assert!(matches!(unzip64("not base64!"), Err(KvError::Codec(_))));
        assert!(matches!(unzip(b"plain bytes"), Err(KvError::Codec(_))));
    }
}
