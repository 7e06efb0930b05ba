//! paperqr-crypto: password-based authenticated encryption for paper backups
//!
//! Pipeline: password + salt → Argon2id → 256-bit key → XChaCha20-Poly1305
//!
//! Encrypted blob format (binary):
//! ```text
//! [24 bytes: random nonce][N bytes: ciphertext][16 bytes: Poly1305 tag]
//! ```
//!
//! The salt is not part of the blob. It travels in the header of the first
//! page so that any complete set of scanned pages is self-describing.

pub mod aead;
pub mod error;
pub mod kdf;

pub use aead::{aead_from_password, build_aead, decrypt, encrypt, encrypt_with_rng, PaperCipher};
pub use error::{CryptoError, CryptoResult};
pub use kdf::{derive_key, generate_salt, generate_salt_with_rng, Key, Salt};

/// Size of a derived key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an XChaCha20-Poly1305 nonce (192-bit)
pub const NONCE_SIZE: usize = 24;

/// Size of a Poly1305 authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of the Argon2id salt carried in the first page header
pub const SALT_SIZE: usize = 16;

/// Minimum password length in bytes
pub const MIN_PASSWORD_LEN: usize = 8;
