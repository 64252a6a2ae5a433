//! Byte-level encryption and decryption under a passphrase.
//!
//! [`ContentTransformer`] is the seam between file handling and cryptography;
//! [`AesContentTransformer`] is the production implementation.
//!
//! ## Ciphertext Format
//!
//! ```text
//! AES-128-CBC(key, iv, PKCS#7(plaintext))
//! ```
//!
//! Raw cipher output only: no header, no embedded IV, no version byte. Key and
//! IV are re-derived from the passphrase on every call (see
//! [`crate::key_material`]).
//!
//! ## Wrong Passphrase Detection
//!
//! There is no authentication tag. A wrong passphrase is detected only through
//! invalid PKCS#7 padding after decryption, which catches it with a
//! probability of roughly 255/256 per file. Corrupted ciphertext and a wrong
//! passphrase are indistinguishable.

use crate::error::{FileCryptError, Result};
use crate::key_material::DerivedKeyMaterial;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

pub trait ContentTransformer {
    /// Encrypts `content` under `passphrase`. Never fails.
    fn encrypt(&self, content: &[u8], passphrase: &str) -> Vec<u8>;

    /// Decrypts `content` under `passphrase`, returning
    /// [`FileCryptError::KeyMismatch`] when the passphrase is wrong.
    fn decrypt(&self, content: &[u8], passphrase: &str) -> Result<Vec<u8>>;
}

/// AES-128-CBC with PKCS#7 padding and SHA-256 derived key/IV
#[derive(Debug, Clone, Copy, Default)]
pub struct AesContentTransformer;

impl AesContentTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl ContentTransformer for AesContentTransformer {
    fn encrypt(&self, content: &[u8], passphrase: &str) -> Vec<u8> {
        let material = DerivedKeyMaterial::derive(passphrase);
        Aes128CbcEnc::new(material.key().into(), material.iv().into())
            .encrypt_padded_vec_mut::<Pkcs7>(content)
    }

    fn decrypt(&self, content: &[u8], passphrase: &str) -> Result<Vec<u8>> {
        // encrypt always emits at least one full block
        if content.is_empty() || content.len() % BLOCK_SIZE != 0 {
            return Err(FileCryptError::MalformedCiphertext { len: content.len() });
        }

        let material = DerivedKeyMaterial::derive(passphrase);
        Aes128CbcDec::new(material.key().into(), material.iv().into())
            .decrypt_padded_vec_mut::<Pkcs7>(content)
            .map_err(|_| FileCryptError::KeyMismatch)
    }
}
