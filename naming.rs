//! Output naming policy.
//!
//! - Encrypt: `<output_dir>/<basename>.enc`
//! - Decrypt: `<output_dir>/<basename without its final dot-segment>`
//!
//! Decryption does not check that the stripped segment is literally `enc`.

use crate::error::{FileCryptError, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Marker appended to every encrypted file name
pub const ENCRYPTION_EXTENSION: &str = ".enc";

/// `test.txt` -> `test.txt.enc`
pub fn encrypted_file_name(source: &Path) -> Result<OsString> {
    let mut name = source
        .file_name()
        .ok_or_else(|| FileCryptError::invalid_file_name(source))?
        .to_os_string();
    name.push(ENCRYPTION_EXTENSION);
    Ok(name)
}

/// `test.txt.enc` -> `test.txt`
pub fn decrypted_file_name(source: &Path) -> Result<OsString> {
    if source.file_name().is_none() {
        return Err(FileCryptError::invalid_file_name(source));
    }
    // `.hidden` has no extension, `name.` has an empty one
    if source.extension().is_none() {
        return Err(FileCryptError::missing_extension(source));
    }
    source
        .file_stem()
        .map(|stem| stem.to_os_string())
        .ok_or_else(|| FileCryptError::missing_extension(source))
}

pub fn encrypted_output_path(source: &Path, output_dir: &Path) -> Result<PathBuf> {
    Ok(output_dir.join(encrypted_file_name(source)?))
}

pub fn decrypted_output_path(source: &Path, output_dir: &Path) -> Result<PathBuf> {
    Ok(output_dir.join(decrypted_file_name(source)?))
}

/// Plain, case-sensitive suffix match on the file name. The empty filter
/// matches everything.
pub fn matches_extension_filter(path: &Path, filter: &str) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => name.ends_with(filter),
        // non UTF-8 names only pass the match-all filter
        None => filter.is_empty(),
    }
}
