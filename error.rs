use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced by content transformation and file operations
#[derive(Debug, Error)]
pub enum FileCryptError {
    /// Padding was invalid after decryption, i.e. the passphrase does not
    /// match the one the content was encrypted with
    #[error("key mismatch: the passphrase does not match the one used for encryption")]
    KeyMismatch,

    /// Ciphertext length is zero or not a multiple of the cipher block size
    #[error("malformed ciphertext: {len} bytes is not a positive multiple of the block size")]
    MalformedCiphertext { len: usize },

    /// Filesystem read/write failures
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Decrypt input name carries no extension to strip
    #[error("file name has no extension to strip: {}", path.display())]
    MissingExtension { path: PathBuf },

    /// Source path has no final file name component
    #[error("path has no file name: {}", path.display())]
    InvalidFileName { path: PathBuf },
}

impl FileCryptError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn missing_extension(path: impl AsRef<Path>) -> Self {
        Self::MissingExtension {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn invalid_file_name(path: impl AsRef<Path>) -> Self {
        Self::InvalidFileName {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Invariant violations: the caller handed in a path the naming policy
    /// cannot work with. Everything else is an ordinary runtime failure.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingExtension { .. } | Self::InvalidFileName { .. }
        )
    }

    pub fn is_key_mismatch(&self) -> bool {
        matches!(self, Self::KeyMismatch)
    }
}

pub type Result<T> = std::result::Result<T, FileCryptError>;
