use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::errors::AppError;
use crate::settings::AppConfig;

use super::store::{MediaKind, MediaStore, MediaUpload, StoredMedia};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Cloudinary HTTP API client. Write operations are signed with the
/// account secret (sha256 mode); metadata reads use basic auth against
/// the admin API.
#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    resource_type: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ResourceMetadata {
    pages: Option<u32>,
}

impl CloudinaryClient {
    pub fn new(config: &AppConfig) -> Self {
        CloudinaryClient {
            http: reqwest::Client::new(),
            cloud_name: config.cloudinary_cloud_name.clone(),
            api_key: config.cloudinary_api_key.clone(),
            api_secret: config.cloudinary_api_secret.clone(),
        }
    }

    /// Signature over the alphabetically ordered request parameters with
    /// the API secret appended, as the provider's signed-request scheme
    /// requires.
    fn sign(&self, params: &[(&str, &str)]) -> String {
        let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
        sorted.sort_by_key(|(k, _)| *k);

        let to_sign = sorted
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        format!("{}/{}/{}/{}", API_BASE, self.cloud_name, kind.as_str(), action)
    }
}

#[async_trait]
impl MediaStore for CloudinaryClient {
    async fn upload(&self, upload: MediaUpload, folder: &str) -> Result<StoredMedia, AppError> {
        let kind = super::store::sniff_upload_kind(&upload);
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[("folder", folder), ("timestamp", &timestamp)]);

        let mut file_part = Part::bytes(upload.bytes);
        if let Some(name) = upload.file_name {
            file_part = file_part.file_name(name);
        }
        if let Some(content_type) = upload.content_type {
            file_part = file_part
                .mime_str(&content_type)
                .map_err(|e| AppError::Internal(format!("Invalid content type: {}", e)))?;
        }

        let form = Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256")
            .text("folder", folder.to_string());

        let response = self
            .http
            .post(self.endpoint(kind, "upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Media upload failed ({}): {}",
                status, body
            )));
        }

        let uploaded: UploadResponse = response.json().await?;
        let kind = match uploaded.resource_type.as_str() {
            "raw" => MediaKind::Raw,
            _ => MediaKind::Image,
        };

        tracing::info!(public_id = %uploaded.public_id, "uploaded media object");

        Ok(StoredMedia {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            kind,
        })
    }

    async fn delete(&self, public_id: &str, kind: MediaKind) -> Result<(), AppError> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.sign(&[
            ("invalidate", "true"),
            ("public_id", public_id),
            ("timestamp", &timestamp),
        ]);

        let form = Form::new()
            .text("public_id", public_id.to_string())
            .text("invalidate", "true")
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http
            .post(self.endpoint(kind, "destroy"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Internal(format!(
                "Media delete failed ({}): {}",
                status, body
            )));
        }

        let outcome: DestroyResponse = response.json().await?;
        // "not found" is fine: the object is gone either way.
        if outcome.result != "ok" && outcome.result != "not found" {
            return Err(AppError::Internal(format!(
                "Media delete rejected: {}",
                outcome.result
            )));
        }

        Ok(())
    }

    async fn page_count(&self, public_id: &str) -> Result<u32, AppError> {
        let url = format!(
            "{}/{}/resources/raw/upload/{}",
            API_BASE, self.cloud_name, public_id
        );

        let response = self
            .http
            .get(url)
            .query(&[("pages", "true")])
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::Internal(format!(
                "Media metadata lookup failed ({})",
                response.status()
            )));
        }

        let metadata: ResourceMetadata = response.json().await?;
        Ok(metadata.pages.unwrap_or(1))
    }
}
