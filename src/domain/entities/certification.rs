use actix_multipart::form::{tempfile::TempFile, text::Text, MultipartForm};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::types::Json;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::errors::AppError;
use crate::media::reference::{pdf_preview_pairs, pdf_thumbnail_url, PagePreview, ThumbnailOptions};
use crate::media::store::MediaKind;
use crate::utils::sanitize::{is_well_formed_url, parse_string_list, sanitize_text};

use super::project::{new_validation_error, validate_title, SortDirection};

pub const MAX_CREDENTIAL_ID_LENGTH: usize = 200;

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub id: Uuid,
    pub title: String,
    pub issuer: String,
    pub issued_at: DateTime<Utc>,
    pub expiration_at: Option<DateTime<Utc>>,
    pub credential_url: Option<String>,
    pub credential_id: Option<String>,
    pub skills: Vec<String>,
    pub image: String,
    #[serde(rename = "isPDF")]
    pub is_pdf: bool,
    pub pdf_pages: Option<i32>,
    pub thumbnail: String,
    pub preview_url: String,
    pub previews: Json<Vec<PagePreview>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CertificationInsert {
    pub id: Uuid,
    pub title: String,
    pub issuer: String,
    pub issued_at: DateTime<Utc>,
    pub expiration_at: Option<DateTime<Utc>>,
    pub credential_url: Option<String>,
    pub credential_id: Option<String>,
    pub skills: Vec<String>,
    pub image: String,
    pub derived: DerivedMedia,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CertificationUpdate {
    pub title: String,
    pub issuer: String,
    pub issued_at: DateTime<Utc>,
    pub expiration_at: Option<DateTime<Utc>>,
    pub credential_url: Option<String>,
    pub credential_id: Option<String>,
    pub skills: Vec<String>,
    pub image: String,
    pub derived: DerivedMedia,
    pub updated_at: DateTime<Utc>,
}

// ───── Derived Display Fields ───────────────────────────────────────

/// Display fields cached on the record and recomputed on every write to
/// `image`. For plain images the thumbnail and preview simply mirror the
/// base URL; for documents they are synthesized transformation URLs.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMedia {
    pub is_pdf: bool,
    pub pdf_pages: Option<i32>,
    pub thumbnail: String,
    pub preview_url: String,
    pub previews: Vec<PagePreview>,
}

impl DerivedMedia {
    pub fn compute(image: &str, kind: MediaKind, total_pages: u32) -> Self {
        match kind {
            MediaKind::Image => DerivedMedia {
                is_pdf: false,
                pdf_pages: None,
                thumbnail: image.to_string(),
                preview_url: image.to_string(),
                previews: Vec::new(),
            },
            MediaKind::Raw => DerivedMedia {
                is_pdf: true,
                pdf_pages: Some(total_pages as i32),
                thumbnail: pdf_thumbnail_url(
                    image,
                    ThumbnailOptions {
                        width: 400,
                        ..Default::default()
                    },
                ),
                // The stored preview is the raw delivery URL; transformed
                // page renditions live in `previews`.
                preview_url: image.to_string(),
                previews: pdf_preview_pairs(image, total_pages),
            },
        }
    }

    /// Carries over the fields already stored on a record, for updates
    /// that do not touch `image`.
    pub fn from_record(record: &Certification) -> Self {
        DerivedMedia {
            is_pdf: record.is_pdf,
            pdf_pages: record.pdf_pages,
            thumbnail: record.thumbnail.clone(),
            preview_url: record.preview_url.clone(),
            previews: record.previews.0.clone(),
        }
    }
}

// ───── Multipart Intake ─────────────────────────────────────────────

#[derive(Debug, MultipartForm)]
pub struct CertificationForm {
    #[multipart(limit = "10MB")]
    pub image: Option<TempFile>,

    pub title: Option<Text<String>>,

    pub issuer: Option<Text<String>>,

    #[multipart(rename = "issuedAt")]
    pub issued_at: Option<Text<String>>,

    #[multipart(rename = "expirationAt")]
    pub expiration_at: Option<Text<String>>,

    #[multipart(rename = "credentialUrl")]
    pub credential_url: Option<Text<String>>,

    #[multipart(rename = "credentialId")]
    pub credential_id: Option<Text<String>>,

    pub skills: Option<Text<String>>,
}

#[derive(Debug, Default, Clone)]
pub struct RawCertificationFields {
    pub title: Option<String>,
    pub issuer: Option<String>,
    pub issued_at: Option<String>,
    pub expiration_at: Option<String>,
    pub credential_url: Option<String>,
    pub credential_id: Option<String>,
    pub skills: Option<String>,
}

impl CertificationForm {
    pub fn into_parts(self) -> (RawCertificationFields, Option<TempFile>) {
        let fields = RawCertificationFields {
            title: self.title.map(|t| t.into_inner()),
            issuer: self.issuer.map(|t| t.into_inner()),
            issued_at: self.issued_at.map(|t| t.into_inner()),
            expiration_at: self.expiration_at.map(|t| t.into_inner()),
            credential_url: self.credential_url.map(|t| t.into_inner()),
            credential_id: self.credential_id.map(|t| t.into_inner()),
            skills: self.skills.map(|t| t.into_inner()),
        };
        (fields, self.image)
    }
}

// ───── Input & Validation ───────────────────────────────────────────

#[derive(Debug, Validate)]
pub struct NewCertificationInput {
    #[validate(custom(function = "validate_title"))]
    pub title: String,

    #[validate(length(min = 1, message = "Issuer is required"))]
    pub issuer: String,

    pub issued_at: DateTime<Utc>,
    pub expiration_at: Option<DateTime<Utc>>,

    #[validate(custom(function = "validate_credential_url"))]
    pub credential_url: Option<String>,

    #[validate(length(max = 200, message = "Credential ID must be less than 200 characters"))]
    pub credential_id: Option<String>,

    #[validate(custom(function = "validate_skills"))]
    pub skills: Vec<String>,
}

impl NewCertificationInput {
    pub fn from_raw(raw: RawCertificationFields) -> Result<Self, AppError> {
        let issued_at = match raw.issued_at.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => parse_date_field("issuedAt", value)?,
            _ => return Err(AppError::validation("issuedAt", "Issued date is required")),
        };
        let expiration_at = parse_optional_date("expirationAt", raw.expiration_at.as_deref())?;

        let skills = match raw.skills.as_deref() {
            Some(value) => parse_string_list("skills", value)?,
            None => Vec::new(),
        };

        let input = NewCertificationInput {
            title: sanitize_text(raw.title.as_deref().unwrap_or_default()),
            issuer: sanitize_text(raw.issuer.as_deref().unwrap_or_default()),
            issued_at,
            expiration_at,
            credential_url: raw.credential_url.filter(|s| !s.trim().is_empty()),
            credential_id: raw
                .credential_id
                .map(|s| sanitize_text(&s))
                .filter(|s| !s.is_empty()),
            skills,
        };

        input.validate()?;
        Ok(input)
    }

    pub fn into_insert(self, image: String, derived: DerivedMedia) -> CertificationInsert {
        let now = Utc::now();
        CertificationInsert {
            id: Uuid::new_v4(),
            title: self.title,
            issuer: self.issuer,
            issued_at: self.issued_at,
            expiration_at: self.expiration_at,
            credential_url: self.credential_url,
            credential_id: self.credential_id,
            skills: self.skills,
            image,
            derived,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update: absent fields keep their previous values. `expiration_at`
/// distinguishes "absent" (keep) from an explicit empty string (clear).
#[derive(Debug, Default, Validate)]
pub struct CertificationPatch {
    #[validate(custom(function = "validate_optional_title"))]
    pub title: Option<String>,

    pub issuer: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub expiration_at: Option<Option<DateTime<Utc>>>,

    #[validate(custom(function = "validate_credential_url"))]
    pub credential_url: Option<String>,

    #[validate(length(max = 200, message = "Credential ID must be less than 200 characters"))]
    pub credential_id: Option<String>,

    #[validate(custom(function = "validate_optional_skills"))]
    pub skills: Option<Vec<String>>,
}

impl CertificationPatch {
    pub fn from_raw(raw: RawCertificationFields) -> Result<Self, AppError> {
        let issued_at = match raw.issued_at.as_deref().map(str::trim) {
            Some(value) if !value.is_empty() => Some(parse_date_field("issuedAt", value)?),
            _ => None,
        };
        let expiration_at = match raw.expiration_at.as_deref().map(str::trim) {
            None => None,
            Some("") => Some(None),
            Some(value) => Some(Some(parse_date_field("expirationAt", value)?)),
        };

        let skills = match raw.skills.as_deref() {
            Some(value) => Some(parse_string_list("skills", value)?),
            None => None,
        };

        let patch = CertificationPatch {
            title: raw.title.map(|s| sanitize_text(&s)),
            issuer: raw.issuer.map(|s| sanitize_text(&s)),
            issued_at,
            expiration_at,
            credential_url: raw.credential_url.filter(|s| !s.trim().is_empty()),
            credential_id: raw
                .credential_id
                .map(|s| sanitize_text(&s))
                .filter(|s| !s.is_empty()),
            skills,
        };

        patch.validate()?;
        Ok(patch)
    }

    /// Applies this patch on top of the current record. `image` and
    /// `derived` have already been resolved by the service: recomputed
    /// when a new file was uploaded, carried over otherwise.
    pub fn apply(
        self,
        current: &Certification,
        image: String,
        derived: DerivedMedia,
    ) -> CertificationUpdate {
        CertificationUpdate {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            issuer: self.issuer.unwrap_or_else(|| current.issuer.clone()),
            issued_at: self.issued_at.unwrap_or(current.issued_at),
            expiration_at: self.expiration_at.unwrap_or(current.expiration_at),
            credential_url: self
                .credential_url
                .or_else(|| current.credential_url.clone()),
            credential_id: self.credential_id.or_else(|| current.credential_id.clone()),
            skills: self.skills.unwrap_or_else(|| current.skills.clone()),
            image,
            derived,
            updated_at: Utc::now(),
        }
    }
}

// ───── List Queries ─────────────────────────────────────────────────

#[derive(Debug, Default, Clone)]
pub struct CertificationFilter {
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CertificationSort {
    #[default]
    Default,
    Title,
    Issuer,
    IssuedAt,
    CreatedAt,
}

impl CertificationSort {
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("title") => CertificationSort::Title,
            Some("issuer") => CertificationSort::Issuer,
            Some("issuedAt") | Some("issued_at") => CertificationSort::IssuedAt,
            Some("createdAt") | Some("created_at") => CertificationSort::CreatedAt,
            _ => CertificationSort::Default,
        }
    }

    pub fn order_by(self, direction: SortDirection) -> String {
        match self {
            CertificationSort::Default => "issued_at DESC".to_string(),
            CertificationSort::Title => format!("title {}", direction.as_sql()),
            CertificationSort::Issuer => format!("issuer {}", direction.as_sql()),
            CertificationSort::IssuedAt => format!("issued_at {}", direction.as_sql()),
            CertificationSort::CreatedAt => format!("created_at {}", direction.as_sql()),
        }
    }
}

// ───── Validation Helpers ───────────────────────────────────────────

/// Accepts full RFC 3339 timestamps or bare `YYYY-MM-DD` dates, the two
/// shapes clients actually send.
fn parse_date_field(field: &str, value: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(AppError::validation(field, "Invalid date format"))
}

fn parse_optional_date(
    field: &str,
    value: Option<&str>,
) -> Result<Option<DateTime<Utc>>, AppError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => parse_date_field(field, v).map(Some),
        _ => Ok(None),
    }
}

fn validate_optional_title(title: &String) -> Result<(), ValidationError> {
    validate_title(title)
}

fn validate_credential_url(url: &String) -> Result<(), ValidationError> {
    if !is_well_formed_url(url) {
        return Err(new_validation_error(
            "invalid_url",
            "Invalid credential URL format",
        ));
    }
    Ok(())
}

fn validate_skills(skills: &Vec<String>) -> Result<(), ValidationError> {
    if skills.iter().any(|s| s.trim().is_empty()) {
        return Err(new_validation_error(
            "skills_empty_entry",
            "Skills must be non-empty strings",
        ));
    }
    Ok(())
}

fn validate_optional_skills(skills: &Vec<String>) -> Result<(), ValidationError> {
    validate_skills(skills)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PDF_URL: &str =
        "https://res.cloudinary.com/demo/raw/upload/v1/portfolio-certifications/aws.pdf";

    fn valid_raw() -> RawCertificationFields {
        RawCertificationFields {
            title: Some("AWS Certified".into()),
            issuer: Some("Amazon".into()),
            issued_at: Some("2024-03-01".into()),
            ..Default::default()
        }
    }

    #[test]
    fn accepts_rfc3339_and_plain_dates() {
        let input = NewCertificationInput::from_raw(valid_raw()).unwrap();
        assert_eq!(input.issued_at.to_rfc3339(), "2024-03-01T00:00:00+00:00");

        let input = NewCertificationInput::from_raw(RawCertificationFields {
            issued_at: Some("2024-03-01T10:30:00Z".into()),
            ..valid_raw()
        })
        .unwrap();
        assert_eq!(input.issued_at.to_rfc3339(), "2024-03-01T10:30:00+00:00");
    }

    #[test]
    fn malformed_date_rejected() {
        let err = NewCertificationInput::from_raw(RawCertificationFields {
            issued_at: Some("March 1st 2024".into()),
            ..valid_raw()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn missing_issued_date_rejected() {
        let err = NewCertificationInput::from_raw(RawCertificationFields {
            issued_at: None,
            ..valid_raw()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn skills_default_to_empty_list() {
        let input = NewCertificationInput::from_raw(valid_raw()).unwrap();
        assert!(input.skills.is_empty());

        let input = NewCertificationInput::from_raw(RawCertificationFields {
            skills: Some("Cloud, Security".into()),
            ..valid_raw()
        })
        .unwrap();
        assert_eq!(input.skills, vec!["Cloud", "Security"]);
    }

    #[test]
    fn overlong_credential_id_rejected() {
        let err = NewCertificationInput::from_raw(RawCertificationFields {
            credential_id: Some("x".repeat(201)),
            ..valid_raw()
        })
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn derived_fields_mirror_plain_images() {
        let url = "https://res.cloudinary.com/demo/image/upload/v1/portfolio-certifications/a.png";
        let derived = DerivedMedia::compute(url, MediaKind::Image, 1);
        assert!(!derived.is_pdf);
        assert_eq!(derived.pdf_pages, None);
        assert_eq!(derived.thumbnail, url);
        assert_eq!(derived.preview_url, url);
        assert!(derived.previews.is_empty());
    }

    #[test]
    fn derived_fields_for_documents() {
        let derived = DerivedMedia::compute(PDF_URL, MediaKind::Raw, 3);
        assert!(derived.is_pdf);
        assert_eq!(derived.pdf_pages, Some(3));
        assert!(derived.thumbnail.contains("w_400"));
        // previewUrl stays the untransformed delivery URL.
        assert_eq!(derived.preview_url, PDF_URL);
        assert_eq!(derived.previews.len(), 3);
        assert_eq!(derived.previews[0].page, 1);
        assert!(derived.previews[0].url.contains("w_1200"));
    }

    #[test]
    fn patch_clears_expiration_on_explicit_empty() {
        let patch = CertificationPatch::from_raw(RawCertificationFields {
            expiration_at: Some("".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(patch.expiration_at, Some(None));

        let patch = CertificationPatch::from_raw(RawCertificationFields::default()).unwrap();
        assert_eq!(patch.expiration_at, None);
    }

    #[test]
    fn sort_allow_list_falls_back_to_default() {
        assert_eq!(
            CertificationSort::from_query(Some("issuedAt")),
            CertificationSort::IssuedAt
        );
        assert_eq!(
            CertificationSort::from_query(Some("evil; --")),
            CertificationSort::Default
        );
        assert_eq!(
            CertificationSort::Default.order_by(SortDirection::Asc),
            "issued_at DESC"
        );
    }
}
