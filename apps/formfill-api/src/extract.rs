//! Document text extraction
//!
//! Thin wrapper over the extraction step the engine treats as opaque:
//! pdf-extract for PDFs, UTF-8 decode for plain text. Failures degrade to
//! empty text so the inferencer falls back instead of the upload failing.

use anyhow::{bail, Result};
use tracing::warn;

/// Upload size cap (decoded bytes)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Accepted upload extensions
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "txt", "text"];

pub fn extension(file_name: &str) -> Option<String> {
    file_name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())
}

/// Reject uploads by extension or size before any decoding work
pub fn validate_upload(file_name: &str, decoded_len: usize) -> Result<()> {
    let Some(ext) = extension(file_name) else {
        bail!("File has no extension; allowed: {}", ALLOWED_EXTENSIONS.join(", "));
    };
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        bail!(
            "Unsupported file type '.{}'; allowed: {}",
            ext,
            ALLOWED_EXTENSIONS.join(", ")
        );
    }
    if decoded_len > MAX_UPLOAD_BYTES {
        bail!(
            "File too large: {} bytes (limit {})",
            decoded_len,
            MAX_UPLOAD_BYTES
        );
    }
    Ok(())
}

/// Pull raw text out of an uploaded document.
///
/// Never fails: an unreadable document yields empty text, which routes the
/// upload to the canonical fallback model downstream.
pub fn extract_text(file_name: &str, data: &[u8]) -> String {
    match extension(file_name).as_deref() {
        Some("pdf") => match pdf_extract::extract_text_from_mem(data) {
            Ok(text) => text,
            Err(e) => {
                warn!("PDF text extraction failed for {}: {}", file_name, e);
                String::new()
            }
        },
        Some("txt") | Some("text") => String::from_utf8_lossy(data).into_owned(),
        _ => String::new(),
    }
}
