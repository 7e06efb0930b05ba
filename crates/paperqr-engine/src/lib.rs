//! paperqr-engine: the full paper backup pipeline
//!
//! Encode: payload → zstd → XChaCha20-Poly1305 → pages → CBOR frames → QR images,
//! then the images are scanned back and compared against the payload before
//! anything is handed to the caller.
//!
//! Decode: QR images → (parallel scan) → pages → reassemble → decrypt → unzstd

pub mod barcode;
pub mod compress;
pub mod engine;

pub use barcode::CommandBarcode;
pub use engine::{decode, encode, encode_with_rng, EncodeOptions, EncodedPages};
