//! Passphrase-based key derivation.
//!
//! This module provides [`DerivedKeyMaterial`], the AES-128 key and CBC
//! initialization vector derived from a passphrase.
//!
//! ## Derivation
//!
//! ```text
//! digest = SHA-256(utf8(passphrase))
//! key    = digest[0..16]
//! iv     = digest[16..32]
//! ```
//!
//! There is no salt and no iteration count, and the IV depends only on the
//! passphrase. Encrypting the same content twice under the same passphrase
//! therefore yields the same ciphertext. The scheme is kept as-is so existing
//! ciphertext stays readable.
//!
//! ## Handling
//!
//! - Recomputed for every transform call, never cached or persisted
//! - Zeroized on drop (via `Zeroize` trait)
//! - `Debug` output is redacted

use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::Zeroize;

/// AES-128 key length in bytes
pub const KEY_LEN: usize = 16;

/// CBC initialization vector length in bytes
pub const IV_LEN: usize = 16;

pub struct DerivedKeyMaterial {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl Drop for DerivedKeyMaterial {
    fn drop(&mut self) {
        self.key.zeroize();
        self.iv.zeroize();
    }
}

impl fmt::Debug for DerivedKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKeyMaterial")
            .field("key", &"<redacted>")
            .field("iv", &"<redacted>")
            .finish()
    }
}

impl DerivedKeyMaterial {
    pub fn derive(passphrase: &str) -> Self {
        let mut digest: [u8; KEY_LEN + IV_LEN] = Sha256::digest(passphrase.as_bytes()).into();

        let mut key = [0u8; KEY_LEN];
        let mut iv = [0u8; IV_LEN];
        key.copy_from_slice(&digest[..KEY_LEN]);
        iv.copy_from_slice(&digest[KEY_LEN..]);
        digest.zeroize();

        Self { key, iv }
    }

    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }
}
