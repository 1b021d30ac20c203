use crate::entities::certification::{
    Certification, CertificationFilter, CertificationPatch, CertificationSort, DerivedMedia,
    NewCertificationInput, RawCertificationFields,
};
use crate::entities::project::SortDirection;
use crate::errors::AppError;
use crate::interfaces::repositories::certification::CertificationRepository;
use crate::media::store::{sniff_mime, CleanupOutcome, MediaKind, MediaStore, MediaUpload};
use crate::utils::pagination::{paginate, PageParams, Paginated};
use crate::utils::valid_uuid::valid_uuid;

use super::cleanup_remote;

pub const CERTIFICATION_MEDIA_FOLDER: &str = "portfolio-certifications";

const ALLOWED_MIMES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/webp",
    "application/pdf",
];

#[derive(Debug)]
pub struct UpdatedCertification {
    pub certification: Certification,
    pub cleanup: Option<CleanupOutcome>,
}

pub struct CertificationHandler<R, M>
where
    R: CertificationRepository,
    M: MediaStore,
{
    pub repo: R,
    pub media: M,
}

impl<R, M> CertificationHandler<R, M>
where
    R: CertificationRepository,
    M: MediaStore,
{
    pub fn new(repo: R, media: M) -> Self {
        CertificationHandler { repo, media }
    }

    pub async fn list(
        &self,
        params: PageParams,
        filter: CertificationFilter,
        sort: CertificationSort,
        direction: SortDirection,
        base_url: &str,
    ) -> Result<Paginated<Certification>, AppError> {
        let total = self.repo.count(&filter).await?;
        let certifications = self.repo.list(&filter, sort, direction, &params).await?;

        Ok(paginate(params, total, certifications, base_url))
    }

    pub async fn get(&self, id: &str) -> Result<Certification, AppError> {
        let id = valid_uuid(id, "certification")?;

        self.repo
            .get(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Certification not found".to_string()))
    }

    /// Creates a certification from a multipart submission. A PDF upload
    /// additionally resolves its page count and populates the derived
    /// preview fields; an image mirrors itself into them.
    pub async fn create(
        &self,
        raw: RawCertificationFields,
        file: Option<MediaUpload>,
    ) -> Result<Certification, AppError> {
        let input = NewCertificationInput::from_raw(raw)?;

        let file =
            file.ok_or_else(|| AppError::MissingFile("Image or PDF is required".to_string()))?;
        validate_mime(&file)?;

        let stored = self.media.upload(file, CERTIFICATION_MEDIA_FOLDER).await?;
        let derived = self.derive_media(&stored.url, stored.kind, &stored.public_id).await;

        let insert = input.into_insert(stored.url, derived);
        self.repo.insert(&insert).await
    }

    /// Updates a certification. A new file replaces the stored object,
    /// recomputes every derived display field from scratch, and deletes
    /// the previous remote object best-effort. Without a file both the
    /// image and its derived fields are left untouched.
    pub async fn update(
        &self,
        id: &str,
        raw: RawCertificationFields,
        file: Option<MediaUpload>,
    ) -> Result<UpdatedCertification, AppError> {
        let id = valid_uuid(id, "certification")?;

        let existing = self
            .repo
            .get(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Certification not found".to_string()))?;

        let patch = CertificationPatch::from_raw(raw)?;

        let (image, derived, cleanup) = match file {
            Some(file) => {
                validate_mime(&file)?;
                let stored = self.media.upload(file, CERTIFICATION_MEDIA_FOLDER).await?;
                let derived = self
                    .derive_media(&stored.url, stored.kind, &stored.public_id)
                    .await;
                let cleanup = cleanup_remote(&self.media, &existing.image).await;
                (stored.url, derived, Some(cleanup))
            }
            None => (
                existing.image.clone(),
                DerivedMedia::from_record(&existing),
                None,
            ),
        };

        let update = patch.apply(&existing, image, derived);
        let certification = self.repo.update(&id, &update).await?;

        Ok(UpdatedCertification {
            certification,
            cleanup,
        })
    }

    pub async fn delete(&self, id: &str) -> Result<CleanupOutcome, AppError> {
        let id = valid_uuid(id, "certification")?;

        let existing = self
            .repo
            .get(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Certification not found".to_string()))?;

        let cleanup = cleanup_remote(&self.media, &existing.image).await;
        self.repo.delete(&id).await?;

        Ok(cleanup)
    }

    /// Page-count lookup failures degrade to a single page instead of
    /// failing the write; the upload already succeeded at this point.
    async fn derive_media(&self, url: &str, kind: MediaKind, public_id: &str) -> DerivedMedia {
        let pages = match kind {
            MediaKind::Image => 1,
            MediaKind::Raw => match self.media.page_count(public_id).await {
                Ok(pages) => pages.max(1),
                Err(e) => {
                    tracing::warn!("Failed to fetch page count for {}: {}", public_id, e);
                    1
                }
            },
        };

        DerivedMedia::compute(url, kind, pages)
    }
}

fn validate_mime(file: &MediaUpload) -> Result<(), AppError> {
    match sniff_mime(file).as_deref() {
        Some(mime) if ALLOWED_MIMES.contains(&mime) => Ok(()),
        _ => Err(AppError::validation(
            "image",
            "Only images (JPG, PNG, WebP) and PDF files are allowed",
        )),
    }
}
