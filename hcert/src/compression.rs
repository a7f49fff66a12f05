// Copyright (c) the hcert contributors.
// Licensed under the MIT License.

//! Zlib decompression of the COSE payload.

use std::io::Read;

use flate2::read::ZlibDecoder;

/// Upper bound on the inflated payload size. Certificate payloads are a few
/// kilobytes; anything near this limit is not a certificate.
pub const MAX_DECOMPRESSED_LEN: u64 = 4 * 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum DecompressError {
    #[error("zlib inflate failed: {0}")]
    Inflate(#[from] std::io::Error),

    #[error("decompressed payload exceeds {MAX_DECOMPRESSED_LEN} bytes")]
    TooLarge,
}

/// Inflate a zlib-compressed buffer, enforcing [`MAX_DECOMPRESSED_LEN`].
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, DecompressError> {
    let mut out = Vec::new();
    let n = ZlibDecoder::new(input)
        .take(MAX_DECOMPRESSED_LEN + 1)
        .read_to_end(&mut out)?;

    if n as u64 > MAX_DECOMPRESSED_LEN {
        return Err(DecompressError::TooLarge);
    }

    Ok(out)
}
