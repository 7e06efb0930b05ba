//! zstd compression of the payload before encryption

use paperqr_core::{PaperError, PaperResult};

/// Compress `data` into a single zstd frame.
pub fn compress(data: &[u8], level: i32) -> PaperResult<Vec<u8>> {
    zstd::encode_all(data, level).map_err(|e| PaperError::Compression(format!("zstd compress: {e}")))
}

/// Decompress a buffer produced by [`compress`].
pub fn decompress(data: &[u8]) -> PaperResult<Vec<u8>> {
    zstd::decode_all(data).map_err(|e| PaperError::Compression(format!("zstd decompress: {e}")))
}
