//! # filecrypt - Passphrase File Encryption Library
//!
//! filecrypt encrypts single files or whole folders with a key derived from a
//! passphrase and writes the results into a separate output directory.
//!
//! ## Features
//!
//! - **AES-128-CBC**: PKCS#7 padding, key and IV derived from SHA-256 of the passphrase
//! - **Folder Operations**: Recursive traversal with a file name suffix filter
//! - **Naming Policy**: `.enc` appended on encrypt, final extension stripped on decrypt
//! - **Wrong Passphrase Detection**: Invalid padding is reported as a key mismatch
//!
//! ## Quick Start
//!
//! ```no_run
//! use filecrypt::file_ops::FileEncryptionService;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let service = FileEncryptionService::aes();
//!
//!     // ./plain/*.txt -> ./encrypted/*.txt.enc
//!     service.encrypt_folder("./plain", "./encrypted", "txt", "passphrase").await?;
//!
//!     // ./encrypted/*.txt.enc -> ./decrypted/*.txt
//!     service.decrypt_folder("./encrypted", "./decrypted", "passphrase").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Ciphertext Format
//!
//! Raw AES-128-CBC output with no header. The IV is derived from the
//! passphrase, so the same content and passphrase always produce the same
//! ciphertext. There is no authentication tag.

pub mod config;
pub mod error;
pub mod file_ops;
pub mod key_material;
pub mod naming;
pub mod transformer;

// Re-export common types for convenience
pub use error::{FileCryptError, Result};
pub use file_ops::FileEncryptionService;
pub use naming::ENCRYPTION_EXTENSION;
pub use transformer::{AesContentTransformer, ContentTransformer};
