use async_trait::async_trait;

use crate::errors::AppError;

/// Delivery kind of a remote media object. Cloudinary serves PDFs and
/// other documents as "raw" resources, everything else as images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Raw,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Raw => "raw",
        }
    }
}

/// A file received over multipart, ready to be pushed to the provider.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

/// Provider response for a stored object.
#[derive(Debug, Clone)]
pub struct StoredMedia {
    pub url: String,
    pub public_id: String,
    pub kind: MediaKind,
}

/// External media host. Upload yields a URL plus the opaque identifier
/// needed to delete the object later; `page_count` asks the provider for
/// the number of pages in a stored document.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload(&self, upload: MediaUpload, folder: &str) -> Result<StoredMedia, AppError>;
    async fn delete(&self, public_id: &str, kind: MediaKind) -> Result<(), AppError>;
    async fn page_count(&self, public_id: &str) -> Result<u32, AppError>;
}

/// Result of a best-effort remote cleanup. Failures are logged by the
/// caller and never abort the enclosing request; the authoritative state
/// is the persisted record, not the remote object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    Deleted,
    /// The stored URL did not resolve to a provider identifier.
    NothingToDelete,
    Failed(String),
}

/// MIME type of an upload: magic bytes first, then the declared content
/// type, then the file extension.
pub fn sniff_mime(upload: &MediaUpload) -> Option<String> {
    if let Some(kind) = infer::get(&upload.bytes) {
        return Some(kind.mime_type().to_string());
    }
    if let Some(declared) = &upload.content_type {
        return Some(declared.clone());
    }
    upload.file_name.as_deref().and_then(|name| {
        let ext = name.rsplit('.').next()?.to_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some("image/jpeg".to_string()),
            "png" => Some("image/png".to_string()),
            "webp" => Some("image/webp".to_string()),
            "pdf" => Some("application/pdf".to_string()),
            _ => None,
        }
    })
}

pub fn sniff_upload_kind(upload: &MediaUpload) -> MediaKind {
    match sniff_mime(upload).as_deref() {
        Some("application/pdf") => MediaKind::Raw,
        _ => MediaKind::Image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(bytes: &[u8], name: Option<&str>, ct: Option<&str>) -> MediaUpload {
        MediaUpload {
            bytes: bytes.to_vec(),
            file_name: name.map(str::to_string),
            content_type: ct.map(str::to_string),
        }
    }

    #[test]
    fn magic_bytes_win_over_declared_type() {
        let pdf = upload(b"%PDF-1.7 rest of file", Some("scan.png"), Some("image/png"));
        assert_eq!(sniff_mime(&pdf).as_deref(), Some("application/pdf"));
        assert_eq!(sniff_upload_kind(&pdf), MediaKind::Raw);
    }

    #[test]
    fn falls_back_to_declared_type_then_extension() {
        let declared = upload(b"\x00\x01", None, Some("image/webp"));
        assert_eq!(sniff_mime(&declared).as_deref(), Some("image/webp"));

        let by_name = upload(b"\x00\x01", Some("photo.JPG"), None);
        assert_eq!(sniff_mime(&by_name).as_deref(), Some("image/jpeg"));

        let unknown = upload(b"\x00\x01", Some("blob.bin"), None);
        assert_eq!(sniff_mime(&unknown), None);
        assert_eq!(sniff_upload_kind(&unknown), MediaKind::Image);
    }
}
