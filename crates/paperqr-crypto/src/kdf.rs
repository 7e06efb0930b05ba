//! Key derivation: Argon2id password + salt → 256-bit key

use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroize;

use crate::error::{CryptoError, CryptoResult};
use crate::{KEY_SIZE, MIN_PASSWORD_LEN, SALT_SIZE};

/// Random Argon2id salt, generated once per encode.
pub type Salt = [u8; SALT_SIZE];

/// A 256-bit key derived from a password via Argon2id.
///
/// Zeroized on drop to prevent secrets lingering in memory.
#[derive(Clone)]
pub struct Key {
    bytes: [u8; KEY_SIZE],
}

impl Key {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for Key {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Key").field("bytes", &"[REDACTED]").finish()
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KdfParams {
    /// Memory cost in KiB
    pub mem_cost_kib: u32,
    /// Time cost / iterations
    pub time_cost: u32,
    /// Parallelism
    pub parallelism: u32,
}

/// Fixed production costs. Every page set ever printed was derived with
/// these, so changing them makes old backups undecryptable.
pub(crate) const KDF_PARAMS: KdfParams = KdfParams {
    mem_cost_kib: 64 * 1024,
    time_cost: 1,
    parallelism: 4,
};

/// Generate a fresh salt from the operating system's CSPRNG.
pub fn generate_salt() -> CryptoResult<Salt> {
    generate_salt_with_rng(&mut OsRng)
}

/// Generate a fresh salt from the given cryptographic RNG.
pub fn generate_salt_with_rng<R: RngCore + CryptoRng>(rng: &mut R) -> CryptoResult<Salt> {
    let mut salt = [0u8; SALT_SIZE];
    rng.try_fill_bytes(&mut salt)
        .map_err(|e| CryptoError::Rng(e.to_string()))?;
    Ok(salt)
}

/// Derive a 256-bit key from a password and salt using Argon2id.
///
/// Deterministic: the same (password, salt) always yields the same key,
/// which is how the decoder rebuilds the encoder's key from the scanned
/// salt. Fails with [`CryptoError::WeakPassword`] below
/// [`MIN_PASSWORD_LEN`] bytes.
pub fn derive_key(password: &SecretString, salt: &Salt) -> CryptoResult<Key> {
    derive_key_with_params(password, salt, &KDF_PARAMS)
}

pub(crate) fn derive_key_with_params(
    password: &SecretString,
    salt: &Salt,
    params: &KdfParams,
) -> CryptoResult<Key> {
    let password = password.expose_secret().as_bytes();
    if password.len() < MIN_PASSWORD_LEN {
        return Err(CryptoError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        });
    }

    let argon2_params = Params::new(
        params.mem_cost_kib,
        params.time_cost,
        params.parallelism,
        Some(KEY_SIZE),
    )
    .map_err(|e| CryptoError::Kdf(format!("invalid Argon2id params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let mut key = [0u8; KEY_SIZE];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| CryptoError::Kdf(e.to_string()))?;

    tracing::debug!(
        mem_cost_kib = params.mem_cost_kib,
        time_cost = params.time_cost,
        parallelism = params.parallelism,
        "derived key"
    );

    Ok(Key::from_bytes(key))
}

#[cfg(test)]
pub(crate) const TEST_KDF_PARAMS: KdfParams = KdfParams {
    mem_cost_kib: 1024,
    time_cost: 1,
    parallelism: 1,
};
