use crate::core::error::VchatError;
use base64::Engine as _;
use base64::engine::general_purpose;
use std::fs;
use std::path::Path;

/// A local image ready to be embedded in a chat message as a data URL.
#[derive(Debug)]
pub struct EncodedImage {
    pub mime_type: String,
    pub base64_data: String,
}

/// Reads an image file and base64-encodes it. The mime type is sniffed from
/// the signature bytes; the file extension is only consulted when sniffing
/// fails, and the final fallback is png.
pub fn load_image(path: &Path) -> Result<EncodedImage, VchatError> {
    let bytes = fs::read(path)?;
    let mime_type = sniff_mime(&bytes).unwrap_or_else(|| mime_from_extension(path));
    tracing::debug!(path = %path.display(), mime = mime_type, size = bytes.len(), "encoded image");
    Ok(EncodedImage {
        mime_type: mime_type.to_string(),
        base64_data: general_purpose::STANDARD.encode(&bytes),
    })
}

fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        _ => "image/png",
    }
}
