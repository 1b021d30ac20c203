pub mod auth;
pub mod certifications;
pub mod home;
pub mod projects;

use actix_multipart::form::tempfile::TempFile;
use actix_web::HttpRequest;

use crate::errors::AppError;
use crate::media::store::MediaUpload;

/// Drains a multipart temp file into the in-memory shape the media layer
/// uploads from. Size limits were already enforced by the form extractor.
pub(crate) async fn read_upload(file: TempFile) -> Result<MediaUpload, AppError> {
    let bytes = tokio::fs::read(file.file.path())
        .await
        .map_err(|e| AppError::Internal(format!("Failed to read uploaded file: {}", e)))?;

    Ok(MediaUpload {
        bytes,
        file_name: file.file_name,
        content_type: file.content_type.map(|mime| mime.to_string()),
    })
}

/// Absolute URL of the current request without its query string; used as
/// the base for pagination links.
pub(crate) fn request_base_url(req: &HttpRequest) -> String {
    let info = req.connection_info();
    format!("{}://{}{}", info.scheme(), info.host(), req.path())
}
