//! File and folder encryption operations.
//!
//! This module provides [`FileEncryptionService`], which maps input files to
//! output files through a [`ContentTransformer`].
//!
//! ## Behavior
//!
//! - Whole-file buffering: each file is read fully, transformed, then written
//! - Files are processed strictly one after another
//! - The first error aborts a batch; outputs already written stay on disk
//! - Existing outputs are overwritten without warning
//! - Output directories are created when missing

use crate::error::{FileCryptError, Result};
use crate::naming::{decrypted_output_path, encrypted_output_path, matches_extension_filter};
use crate::transformer::{AesContentTransformer, ContentTransformer};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info, warn};

pub struct FileEncryptionService<T: ContentTransformer = AesContentTransformer> {
    transformer: T,
    recursive: bool,
}

impl FileEncryptionService<AesContentTransformer> {
    pub fn aes() -> Self {
        Self::new(AesContentTransformer::new())
    }
}

impl Default for FileEncryptionService<AesContentTransformer> {
    fn default() -> Self {
        Self::aes()
    }
}

impl<T: ContentTransformer> FileEncryptionService<T> {
    pub fn new(transformer: T) -> Self {
        Self {
            transformer,
            recursive: true,
        }
    }

    /// Whether folder operations descend into subdirectories (default: true)
    pub fn with_recursion(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    pub fn transformer(&self) -> &T {
        &self.transformer
    }

    /// Encrypts `source` into `<output_dir>/<basename>.enc` and returns the
    /// written path.
    pub async fn encrypt_file(
        &self,
        source: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        passphrase: &str,
    ) -> Result<PathBuf> {
        let source = source.as_ref();
        let target = encrypted_output_path(source, output_dir.as_ref())?;
        debug!(file = %source.display(), target = %target.display(), "encrypting file");

        let data = read_file(source).await?;
        let enc = self.transformer.encrypt(&data, passphrase);
        write_file(&target, &enc).await?;

        info!(
            file = %source.display(),
            original_size = data.len(),
            encrypted_size = enc.len(),
            "file encrypted successfully"
        );
        Ok(target)
    }

    /// Decrypts `source` into `<output_dir>/<basename minus final extension>`
    /// and returns the written path. Nothing is written on a key mismatch.
    pub async fn decrypt_file(
        &self,
        source: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        passphrase: &str,
    ) -> Result<PathBuf> {
        let source = source.as_ref();
        let target = decrypted_output_path(source, output_dir.as_ref())?;
        debug!(file = %source.display(), target = %target.display(), "decrypting file");

        let data = read_file(source).await?;
        let plaintext = match self.transformer.decrypt(&data, passphrase) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                error!(file = %source.display(), error = %e, "decryption failed");
                return Err(e);
            }
        };
        write_file(&target, &plaintext).await?;

        info!(
            file = %source.display(),
            encrypted_size = data.len(),
            decrypted_size = plaintext.len(),
            "file decrypted successfully"
        );
        Ok(target)
    }

    /// Encrypts every file under `source_dir` whose name ends with
    /// `extension_filter`.
    pub async fn encrypt_folder(
        &self,
        source_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        extension_filter: &str,
        passphrase: &str,
    ) -> Result<Vec<PathBuf>> {
        let source_dir = source_dir.as_ref();
        let output_dir = output_dir.as_ref();
        let files = self.list_files(source_dir, Some(extension_filter)).await?;
        info!(
            dir = %source_dir.display(),
            filter = extension_filter,
            count = files.len(),
            "encrypting folder"
        );

        let mut written = Vec::with_capacity(files.len());
        let mut seen = HashSet::new();
        for file in &files {
            let target = self.encrypt_file(file, output_dir, passphrase).await?;
            note_collision(&mut seen, file, &target);
            written.push(target);
        }

        info!(dir = %source_dir.display(), count = written.len(), "folder encrypted successfully");
        Ok(written)
    }

    /// Decrypts every file under `source_dir`. No filter is applied: the
    /// folder is expected to hold only encrypted files.
    pub async fn decrypt_folder(
        &self,
        source_dir: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        passphrase: &str,
    ) -> Result<Vec<PathBuf>> {
        let source_dir = source_dir.as_ref();
        let output_dir = output_dir.as_ref();
        let files = self.list_files(source_dir, None).await?;
        info!(dir = %source_dir.display(), count = files.len(), "decrypting folder");

        let mut written = Vec::with_capacity(files.len());
        let mut seen = HashSet::new();
        for file in &files {
            let target = match self.decrypt_file(file, output_dir, passphrase).await {
                Ok(target) => target,
                Err(e) => {
                    if e.is_key_mismatch() {
                        warn!(
                            file = %file.display(),
                            already_written = written.len(),
                            "wrong passphrase, aborting folder decryption"
                        );
                    }
                    return Err(e);
                }
            };
            note_collision(&mut seen, file, &target);
            written.push(target);
        }

        info!(dir = %source_dir.display(), count = written.len(), "folder decrypted successfully");
        Ok(written)
    }

    /// Lists the files a folder operation on `dir` would process, sorted by
    /// path. Symlinks to files are included; symlinked directories are not
    /// followed.
    pub async fn list_files(&self, dir: impl AsRef<Path>, filter: Option<&str>) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![dir.as_ref().to_path_buf()];

        while let Some(current) = pending.pop() {
            let mut entries = fs::read_dir(&current)
                .await
                .map_err(|e| FileCryptError::io(&current, e))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| FileCryptError::io(&current, e))?
            {
                let path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|e| FileCryptError::io(&path, e))?;

                let is_file = if file_type.is_dir() {
                    if self.recursive {
                        pending.push(path);
                    }
                    continue;
                } else if file_type.is_symlink() {
                    match fs::metadata(&path).await {
                        Ok(meta) => meta.is_file(),
                        Err(e) => {
                            warn!(path = %path.display(), error = %e, "skipping dangling symlink");
                            false
                        }
                    }
                } else {
                    file_type.is_file()
                };

                if !is_file {
                    continue;
                }
                if let Some(filter) = filter {
                    if !matches_extension_filter(&path, filter) {
                        continue;
                    }
                }
                files.push(path);
            }
        }

        // Sort for consistent ordering
        files.sort();
        debug!(dir = %dir.as_ref().display(), count = files.len(), "listed files");
        Ok(files)
    }
}

fn note_collision(seen: &mut HashSet<PathBuf>, source: &Path, target: &Path) {
    if !seen.insert(target.to_path_buf()) {
        warn!(
            file = %source.display(),
            target = %target.display(),
            "output name collides with an earlier file in this batch, overwriting"
        );
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).await.map_err(|e| FileCryptError::io(path, e))
}

async fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| FileCryptError::io(parent, e))?;
    }
    fs::write(path, content)
        .await
        .map_err(|e| FileCryptError::io(path, e))
}
