//! Filesystem helpers for workflow file operations.
//!
//! Writes go through a write-then-rename temp file so a reader never sees a
//! partially written workflow, and content comparison uses SHA-256 checksums
//! so the copy engine can tell identical content from a real overwrite.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Ensure a directory exists, creating it and any parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        anyhow::bail!("path exists but is not a directory: {}", path.display());
    }
    Ok(())
}

/// Atomically write bytes to a file.
///
/// Content lands in a `.tmp` sibling first, is synced, then renamed over the
/// target. Parent directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let temp_path = path.with_extension("tmp");
    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
        file.write_all(content)
            .with_context(|| format!("failed to write temp file: {}", temp_path.display()))?;
        file.sync_all().context("failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// SHA-256 checksum of a file's content, hex encoded.
pub fn calculate_checksum(path: &Path) -> Result<String> {
    let content =
        fs::read(path).with_context(|| format!("failed to read file: {}", path.display()))?;
    Ok(hex::encode(Sha256::digest(&content)))
}
