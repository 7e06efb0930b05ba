use thiserror::Error;

use paperqr_crypto::CryptoError;
use paperqr_pages::PageError;

pub type PaperResult<T> = Result<T, PaperError>;

#[derive(Debug, Error)]
pub enum PaperError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Pages(#[from] PageError),

    #[error("config error: {0}")]
    Config(String),

    #[error("compression error: {0}")]
    Compression(String),

    #[error("barcode error: {0}")]
    Barcode(String),

    #[error("verification of generated pages failed: {0}")]
    Verification(String),
}
