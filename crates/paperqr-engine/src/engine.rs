//! Encode and decode pipelines
//!
//! The engine never trusts its own output: `encode` scans the rendered
//! images back, decodes them with the same password, and refuses to return
//! pages that do not reproduce the payload byte for byte.

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use secrecy::SecretString;

use paperqr_core::{PaperConfig, PaperError, PaperResult};
use paperqr_crypto::{aead_from_password, decrypt, encrypt_with_rng, generate_salt_with_rng, CryptoError};
use paperqr_pages::{
    encode_frames, reassemble, scan_pages, Barcode, CborCodec, PageImage, PageLayout,
    MAX_FRAME_BYTES, MAX_PAGE_COUNT,
};

use crate::compress::{compress, decompress};

#[derive(Debug, Clone)]
pub struct EncodeOptions {
    /// Refuse to produce more pages than this
    pub max_pages: usize,
    /// zstd level
    pub compression_level: i32,
    /// Scan workers used for verification (0 = cpu_count)
    pub workers: usize,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            max_pages: 10,
            compression_level: 19,
            workers: 0,
        }
    }
}

impl EncodeOptions {
    pub fn from_config(config: &PaperConfig) -> Self {
        Self {
            max_pages: config.output.effective_max_pages(),
            compression_level: config.compression.level,
            workers: config.scan.workers,
        }
    }
}

/// Result of a successful, verified encode.
#[derive(Debug, Clone)]
pub struct EncodedPages {
    /// Rendered barcode images, page 1 first
    pub images: Vec<Vec<u8>>,
    pub payload_len: usize,
    pub compressed_len: usize,
    /// Length of nonce + ciphertext + tag spread across the pages
    pub blob_len: usize,
}

impl EncodedPages {
    pub fn page_count(&self) -> usize {
        self.images.len()
    }
}

/// Encode `payload` into verified barcode images using the OS CSPRNG.
pub fn encode<B>(
    payload: &[u8],
    password: &SecretString,
    barcode: &B,
    options: &EncodeOptions,
) -> PaperResult<EncodedPages>
where
    B: Barcode + Sync + ?Sized,
{
    encode_with_rng(payload, password, barcode, options, &mut OsRng)
}

/// Encode `payload`, drawing the salt and nonce from `rng`.
pub fn encode_with_rng<B, R>(
    payload: &[u8],
    password: &SecretString,
    barcode: &B,
    options: &EncodeOptions,
    rng: &mut R,
) -> PaperResult<EncodedPages>
where
    B: Barcode + Sync + ?Sized,
    R: RngCore + CryptoRng,
{
    let compressed = compress(payload, options.compression_level)?;

    let salt = generate_salt_with_rng(rng)?;
    let cipher = aead_from_password(password, &salt)?;
    let blob = encrypt_with_rng(&cipher, rng, &compressed)?;
    let blob_len = blob.len();

    let layout = PageLayout::for_codec(&CborCodec, MAX_FRAME_BYTES)?;
    let records = layout.frame(&salt, blob, options.max_pages.min(MAX_PAGE_COUNT))?;
    let frames = encode_frames(&CborCodec, &records, MAX_FRAME_BYTES)?;

    let images = frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            barcode
                .render(frame)
                .map_err(|e| PaperError::Barcode(format!("failed to generate page {}: {e:#}", i + 1)))
        })
        .collect::<PaperResult<Vec<_>>>()?;

    tracing::info!(
        payload_len = payload.len(),
        compressed_len = compressed.len(),
        blob_len,
        pages = images.len(),
        "encoded payload"
    );

    verify(payload, password, barcode, &images, options.workers)?;

    Ok(EncodedPages {
        images,
        payload_len: payload.len(),
        compressed_len: compressed.len(),
        blob_len,
    })
}

/// Decode an unordered set of page images back into the payload.
pub fn decode<B>(
    images: &[PageImage],
    password: &SecretString,
    barcode: &B,
    workers: usize,
) -> PaperResult<Vec<u8>>
where
    B: Barcode + Sync + ?Sized,
{
    let records = scan_pages(images, barcode, &CborCodec, workers)?;
    let (blob, salt) = reassemble(records)?;

    let cipher = aead_from_password(password, &salt)?;
    let compressed = decrypt(&cipher, &blob).map_err(|e| {
        if matches!(e, CryptoError::Authentication) {
            tracing::error!("decryption failed, check the password and retry");
        }
        e
    })?;
    let payload = decompress(&compressed)?;

    tracing::info!(pages = images.len(), payload_len = payload.len(), "decoded payload");
    Ok(payload)
}

fn verify<B>(
    payload: &[u8],
    password: &SecretString,
    barcode: &B,
    images: &[Vec<u8>],
    workers: usize,
) -> PaperResult<()>
where
    B: Barcode + Sync + ?Sized,
{
    let pages: Vec<PageImage> = images
        .iter()
        .enumerate()
        .map(|(i, image)| PageImage::new(format!("generated page {}", i + 1), image.clone()))
        .collect();

    let decoded = decode(&pages, password, barcode, workers)
        .map_err(|e| PaperError::Verification(format!("generated pages do not decode: {e}")))?;
    if decoded != payload {
        return Err(PaperError::Verification(
            "input data and decoded page data are different".into(),
        ));
    }

    tracing::debug!(pages = images.len(), "verified generated pages");
    Ok(())
}
