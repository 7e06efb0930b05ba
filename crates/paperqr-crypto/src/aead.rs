//! XChaCha20-Poly1305 sealing of the whole (compressed) payload
//!
//! Every call to [`encrypt`] draws a fresh 192-bit nonce; there is no way to
//! pass a nonce in. The nonce is stored in front of the ciphertext so the
//! blob is self-contained.

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use secrecy::SecretString;

use crate::error::{CryptoError, CryptoResult};
use crate::kdf::{derive_key, Key, Salt};
use crate::NONCE_SIZE;

/// An AEAD cipher keyed from a derived [`Key`].
#[derive(Clone)]
pub struct PaperCipher {
    inner: XChaCha20Poly1305,
}

impl std::fmt::Debug for PaperCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperCipher")
            .field("algorithm", &"XChaCha20-Poly1305")
            .finish_non_exhaustive()
    }
}

/// Wrap a derived key into an XChaCha20-Poly1305 cipher.
pub fn build_aead(key: &Key) -> CryptoResult<PaperCipher> {
    let inner =
        XChaCha20Poly1305::new_from_slice(key.as_bytes()).map_err(|_| CryptoError::CipherInit)?;
    Ok(PaperCipher { inner })
}

/// Derive the key for `(password, salt)` and build the cipher in one step.
pub fn aead_from_password(password: &SecretString, salt: &Salt) -> CryptoResult<PaperCipher> {
    let key = derive_key(password, salt)?;
    build_aead(&key)
}

/// Seal `plaintext` under a nonce drawn from the OS CSPRNG.
///
/// Returns: `[24-byte nonce][ciphertext][16-byte tag]`
pub fn encrypt(cipher: &PaperCipher, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    encrypt_with_rng(cipher, &mut OsRng, plaintext)
}

/// Seal `plaintext` under a nonce drawn from `rng`.
///
/// Only the randomness source is injectable; a seeded RNG makes the output
/// reproducible in tests.
pub fn encrypt_with_rng<R: RngCore + CryptoRng>(
    cipher: &PaperCipher,
    rng: &mut R,
    plaintext: &[u8],
) -> CryptoResult<Vec<u8>> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rng.try_fill_bytes(&mut nonce_bytes)
        .map_err(|e| CryptoError::Rng(e.to_string()))?;
    let nonce = XNonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .inner
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::Encryption)?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Open a blob produced by [`encrypt`].
///
/// Input: `[24-byte nonce][ciphertext][16-byte tag]`
pub fn decrypt(cipher: &PaperCipher, blob: &[u8]) -> CryptoResult<Vec<u8>> {
    if blob.len() < NONCE_SIZE {
        return Err(CryptoError::MalformedBlob {
            len: blob.len(),
            min: NONCE_SIZE,
        });
    }

    let (nonce_bytes, ciphertext) = blob.split_at(NONCE_SIZE);
    let nonce = XNonce::from_slice(nonce_bytes);

    cipher.inner.decrypt(nonce, ciphertext).map_err(|_| {
        tracing::debug!(blob_len = blob.len(), "authentication tag rejected");
        CryptoError::Authentication
    })
}
