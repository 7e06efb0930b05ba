use thiserror::Error;

pub type CryptoResult<T> = Result<T, CryptoError>;

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("password must be at least {min} bytes long")]
    WeakPassword { min: usize },

    #[error("failed to initialise XChaCha20-Poly1305 cipher")]
    CipherInit,

    #[error("encrypted blob is {len} bytes, shorter than the {min}-byte nonce")]
    MalformedBlob { len: usize, min: usize },

    /// Deliberately carries no cause: a wrong password and tampered data
    /// must be indistinguishable to the caller.
    #[error("decryption failed: wrong password or corrupted data")]
    Authentication,

    #[error("encryption failed")]
    Encryption,

    #[error("Argon2id key derivation failed: {0}")]
    Kdf(String),

    #[error("secure random source failed: {0}")]
    Rng(String),
}
