//! File codec.
//!
//! Every file exchanged with Watana travels as `base64(zip(bytes))`: the
//! raw bytes are stored as the single entry of a zip archive, and the
//! archive is base64 encoded. This module provides both halves of that
//! transformation and their inverses.

use crate::error::{Result, WatanaError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::fs::File;
use std::future::Future;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tempfile::NamedTempFile;
use tracing::warn;
use uuid::Uuid;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Compress `bytes` into a zip archive holding a single entry named
/// `name.extension`.
///
/// An empty `name` is replaced by a random identifier. The extension may
/// be given with or without its leading dot, and may be empty.
///
/// # Example
///
/// ```rust
/// use watana::codec;
///
/// let zipped = codec::compress(b"%PDF-1.7", "contract", "pdf").unwrap();
/// assert_eq!(codec::decompress(&zipped).unwrap(), b"%PDF-1.7");
/// ```
pub fn compress(bytes: &[u8], name: &str, extension: &str) -> Result<Vec<u8>> {
    let entry = entry_name(name, extension);
    let cursor = write_archive(Cursor::new(Vec::new()), bytes, &entry)?;
    Ok(cursor.into_inner())
}

/// Same contract as [`compress`], but the archive is staged in a temporary
/// file instead of memory. Meant for large inputs.
///
/// The staging file is removed on every exit path. A failed removal is
/// logged and does not affect the result.
pub async fn compress_buffered(bytes: Vec<u8>, name: &str, extension: &str) -> Result<Vec<u8>> {
    compress_buffered_with_cancel(bytes, name, extension, std::future::pending()).await
}

/// [`compress_buffered`], stopped with [`WatanaError::Cancelled`] once
/// `cancel` completes.
///
/// Staging checks for cancellation between steps. The call only returns
/// after the staging file has been released.
pub async fn compress_buffered_with_cancel<C>(
    bytes: Vec<u8>,
    name: &str,
    extension: &str,
    cancel: C,
) -> Result<Vec<u8>>
where
    C: Future<Output = ()>,
{
    let entry = entry_name(name, extension);
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);
    let mut task =
        tokio::task::spawn_blocking(move || compress_via_tempfile(None, &bytes, &entry, &flag));

    let outcome = tokio::select! {
        biased;
        _ = cancel => None,
        joined = &mut task => Some(joined),
    };

    match outcome {
        Some(joined) => joined
            .map_err(|e| WatanaError::Unexpected(format!("compression task failed: {e}")))?,
        None => {
            cancelled.store(true, Ordering::SeqCst);
            // Wait for the staging file to be released.
            let _ = task.await;
            Err(WatanaError::Cancelled)
        }
    }
}

/// Extract the first entry of a zip archive.
///
/// Entries after the first are ignored.
pub fn decompress(zip_bytes: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(zip_bytes))
        .map_err(|e| WatanaError::InvalidArchive(e.to_string()))?;

    if archive.len() == 0 {
        return Err(WatanaError::EmptyArchive);
    }

    let mut entry = archive
        .by_index(0)
        .map_err(|e| WatanaError::InvalidArchive(e.to_string()))?;
    // The declared size comes from the archive itself and is not trusted.
    let mut out = Vec::new();
    entry
        .read_to_end(&mut out)
        .map_err(|e| WatanaError::InvalidArchive(e.to_string()))?;
    Ok(out)
}

/// Standard base64 encoding.
pub fn encode_base64(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Standard base64 decoding.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>> {
    BASE64
        .decode(encoded)
        .map_err(|e| WatanaError::InvalidEncoding(e.to_string()))
}

/// `base64(zip(bytes))`, the form Watana expects for file content.
pub fn pack(bytes: &[u8], name: &str, extension: &str) -> Result<String> {
    Ok(encode_base64(&compress(bytes, name, extension)?))
}

/// Inverse of [`pack`].
pub fn unpack(encoded: &str) -> Result<Vec<u8>> {
    decompress(&decode_base64(encoded)?)
}

fn entry_name(name: &str, extension: &str) -> String {
    let name = name.trim();
    let name = if name.is_empty() {
        Uuid::new_v4().simple().to_string()
    } else {
        name.to_string()
    };

    match extension.trim().trim_start_matches('.') {
        "" => name,
        ext => format!("{name}.{ext}"),
    }
}

fn write_archive<W: Write + Seek>(sink: W, bytes: &[u8], entry: &str) -> Result<W> {
    let mut writer = ZipWriter::new(sink);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    writer
        .start_file(entry, options)
        .map_err(|e| WatanaError::Compression(e.to_string()))?;
    writer
        .write_all(bytes)
        .map_err(|e| WatanaError::Compression(e.to_string()))?;
    writer
        .finish()
        .map_err(|e| WatanaError::Compression(e.to_string()))
}

pub(crate) fn compress_via_tempfile(
    dir: Option<&Path>,
    bytes: &[u8],
    entry: &str,
    cancelled: &AtomicBool,
) -> Result<Vec<u8>> {
    let staged = match dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    };
    let mut staged = staged.map_err(|e| WatanaError::Compression(e.to_string()))?;
    let result = stage_archive(staged.as_file_mut(), bytes, entry, cancelled);

    let path = staged.path().to_path_buf();
    if let Err(e) = staged.close() {
        warn!(path = %path.display(), error = %e, "failed to remove staging file");
    }

    result
}

fn stage_archive(
    file: &mut File,
    bytes: &[u8],
    entry: &str,
    cancelled: &AtomicBool,
) -> Result<Vec<u8>> {
    check_cancelled(cancelled)?;
    write_archive(&mut *file, bytes, entry)?;
    check_cancelled(cancelled)?;

    let mut out = Vec::new();
    file.seek(SeekFrom::Start(0))
        .and_then(|_| file.read_to_end(&mut out))
        .map_err(|e| WatanaError::Compression(e.to_string()))?;
    Ok(out)
}

fn check_cancelled(cancelled: &AtomicBool) -> Result<()> {
    if cancelled.load(Ordering::SeqCst) {
        Err(WatanaError::Cancelled)
    } else {
        Ok(())
    }
}
