use crate::entities::project::{
    NewProjectInput, Project, ProjectFilter, ProjectPatch, ProjectSort, RawProjectFields,
    SortDirection,
};
use crate::errors::AppError;
use crate::interfaces::repositories::project::ProjectRepository;
use crate::media::store::{sniff_mime, CleanupOutcome, MediaStore, MediaUpload};
use crate::utils::pagination::{paginate, PageParams, Paginated};
use crate::utils::valid_uuid::valid_uuid;

use super::cleanup_remote;

pub const PROJECT_MEDIA_FOLDER: &str = "portfolio-projects";

const ALLOWED_IMAGE_MIMES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// An updated or deleted record together with what happened to the remote
/// object it used to reference.
#[derive(Debug)]
pub struct UpdatedProject {
    pub project: Project,
    pub cleanup: Option<CleanupOutcome>,
}

pub struct ProjectHandler<R, M>
where
    R: ProjectRepository,
    M: MediaStore,
{
    pub repo: R,
    pub media: M,
}

impl<R, M> ProjectHandler<R, M>
where
    R: ProjectRepository,
    M: MediaStore,
{
    pub fn new(repo: R, media: M) -> Self {
        ProjectHandler { repo, media }
    }

    pub async fn list(
        &self,
        params: PageParams,
        filter: ProjectFilter,
        sort: ProjectSort,
        direction: SortDirection,
        base_url: &str,
    ) -> Result<Paginated<Project>, AppError> {
        let total = self.repo.count(&filter).await?;
        let projects = self.repo.list(&filter, sort, direction, &params).await?;

        Ok(paginate(params, total, projects, base_url))
    }

    pub async fn get(&self, id: &str) -> Result<Project, AppError> {
        let id = valid_uuid(id, "project")?;

        self.repo
            .get(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))
    }

    pub async fn create(
        &self,
        raw: RawProjectFields,
        file: Option<MediaUpload>,
    ) -> Result<Project, AppError> {
        let input = NewProjectInput::from_raw(raw)?;

        let file = file.ok_or_else(|| AppError::MissingFile("Image is required".to_string()))?;
        validate_image_mime(&file)?;

        let stored = self.media.upload(file, PROJECT_MEDIA_FOLDER).await?;
        let insert = input.into_insert(stored.url);

        self.repo.insert(&insert).await
    }

    /// Updates a project. A new file replaces the stored image and the
    /// previous remote object is deleted best-effort; without a file the
    /// image is left untouched.
    pub async fn update(
        &self,
        id: &str,
        raw: RawProjectFields,
        file: Option<MediaUpload>,
    ) -> Result<UpdatedProject, AppError> {
        let id = valid_uuid(id, "project")?;

        let existing = self
            .repo
            .get(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        let patch = ProjectPatch::from_raw(raw)?;

        let (image, cleanup) = match file {
            Some(file) => {
                validate_image_mime(&file)?;
                let stored = self.media.upload(file, PROJECT_MEDIA_FOLDER).await?;
                let cleanup = cleanup_remote(&self.media, &existing.image).await;
                (stored.url, Some(cleanup))
            }
            None => (existing.image.clone(), None),
        };

        let update = patch.apply(&existing, image);
        let project = self.repo.update(&id, &update).await?;

        Ok(UpdatedProject { project, cleanup })
    }

    /// Deletes a project and best-effort removes its remote image. A
    /// missing record returns 404 without touching the media provider.
    pub async fn delete(&self, id: &str) -> Result<CleanupOutcome, AppError> {
        let id = valid_uuid(id, "project")?;

        let existing = self
            .repo
            .get(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Project not found".to_string()))?;

        let cleanup = cleanup_remote(&self.media, &existing.image).await;
        self.repo.delete(&id).await?;

        Ok(cleanup)
    }
}

fn validate_image_mime(file: &MediaUpload) -> Result<(), AppError> {
    match sniff_mime(file).as_deref() {
        Some(mime) if ALLOWED_IMAGE_MIMES.contains(&mime) => Ok(()),
        _ => Err(AppError::validation(
            "image",
            "Only images (JPG, PNG, WebP) are allowed",
        )),
    }
}
