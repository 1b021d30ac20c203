use chrono::Utc;
use mockall::{mock, predicate::eq};
use uuid::Uuid;

use portfolio_api::entities::project::{
    Project, ProjectFilter, ProjectInsert, ProjectSort, ProjectUpdate, RawProjectFields,
    SortDirection,
};
use portfolio_api::errors::AppError;
use portfolio_api::media::store::{
    CleanupOutcome, MediaKind, MediaStore, MediaUpload, StoredMedia,
};
use portfolio_api::repositories::project::ProjectRepository;
use portfolio_api::use_cases::projects::ProjectHandler;
use portfolio_api::utils::pagination::PageParams;

mock! {
    pub ProjectRepo {}

    #[async_trait::async_trait]
    impl ProjectRepository for ProjectRepo {
        async fn count(&self, filter: &ProjectFilter) -> Result<i64, AppError>;
        async fn list(
            &self,
            filter: &ProjectFilter,
            sort: ProjectSort,
            direction: SortDirection,
            params: &PageParams,
        ) -> Result<Vec<Project>, AppError>;
        async fn get(&self, id: &Uuid) -> Result<Option<Project>, AppError>;
        async fn insert(&self, project: &ProjectInsert) -> Result<Project, AppError>;
        async fn update(&self, id: &Uuid, project: &ProjectUpdate) -> Result<Project, AppError>;
        async fn delete(&self, id: &Uuid) -> Result<(), AppError>;
    }
}

mock! {
    pub Media {}

    #[async_trait::async_trait]
    impl MediaStore for Media {
        async fn upload(&self, upload: MediaUpload, folder: &str) -> Result<StoredMedia, AppError>;
        async fn delete(&self, public_id: &str, kind: MediaKind) -> Result<(), AppError>;
        async fn page_count(&self, public_id: &str) -> Result<u32, AppError>;
    }
}

const OLD_IMAGE_URL: &str =
    "https://res.cloudinary.com/demo/image/upload/v1/portfolio-projects/old.jpg";
const NEW_IMAGE_URL: &str =
    "https://res.cloudinary.com/demo/image/upload/v2/portfolio-projects/new.jpg";

fn sample_project(id: Uuid) -> Project {
    let now = Utc::now();
    Project {
        id,
        title: "Portfolio Site".to_string(),
        description_en: "English".to_string(),
        description_id: "Indonesia".to_string(),
        image: OLD_IMAGE_URL.to_string(),
        technologies: vec!["React".to_string()],
        demo_url: None,
        github_url: None,
        featured: false,
        order: 0,
        created_at: now,
        updated_at: now,
    }
}

fn jpeg_upload() -> MediaUpload {
    MediaUpload {
        bytes: b"\xFF\xD8\xFF\xE0fakejpegbody".to_vec(),
        file_name: Some("photo.jpg".to_string()),
        content_type: Some("image/jpeg".to_string()),
    }
}

fn stored(url: &str) -> StoredMedia {
    StoredMedia {
        url: url.to_string(),
        public_id: "portfolio-projects/new".to_string(),
        kind: MediaKind::Image,
    }
}

fn raw_fields(technologies: &str) -> RawProjectFields {
    RawProjectFields {
        title: Some("Portfolio Site".to_string()),
        description_en: Some("English".to_string()),
        description_id: Some("Indonesia".to_string()),
        technologies: Some(technologies.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_accepts_json_and_csv_technology_lists() {
    for raw in [r#"["React","Node.js"]"#, "React, Node.js"] {
        let mut repo = MockProjectRepo::new();
        let mut media = MockMedia::new();

        media
            .expect_upload()
            .withf(|_, folder| folder == "portfolio-projects")
            .times(1)
            .returning(|_, _| Ok(stored(NEW_IMAGE_URL)));

        repo.expect_insert()
            .withf(|insert| {
                insert.technologies == vec!["React".to_string(), "Node.js".to_string()]
                    && insert.image == NEW_IMAGE_URL
            })
            .times(1)
            .returning(|insert| {
                let mut project = sample_project(insert.id);
                project.technologies = insert.technologies.clone();
                project.image = insert.image.clone();
                Ok(project)
            });

        let handler = ProjectHandler::new(repo, media);
        let project = handler
            .create(raw_fields(raw), Some(jpeg_upload()))
            .await
            .unwrap();

        assert_eq!(project.technologies, vec!["React", "Node.js"]);
    }
}

#[tokio::test]
async fn create_without_file_is_rejected_before_upload() {
    let handler = ProjectHandler::new(MockProjectRepo::new(), MockMedia::new());

    let err = handler
        .create(raw_fields("React"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::MissingFile(_)));
}

#[tokio::test]
async fn create_rejects_pdf_bytes_for_projects() {
    let handler = ProjectHandler::new(MockProjectRepo::new(), MockMedia::new());

    let pdf = MediaUpload {
        bytes: b"%PDF-1.7 not an image".to_vec(),
        file_name: Some("scan.jpg".to_string()),
        content_type: Some("image/jpeg".to_string()),
    };

    let err = handler.create(raw_fields("React"), Some(pdf)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn malformed_id_is_rejected_before_storage() {
    let handler = ProjectHandler::new(MockProjectRepo::new(), MockMedia::new());

    let err = handler.get("definitely-not-a-uuid").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidId(_)));

    let err = handler.delete("123").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidId(_)));
}

#[tokio::test]
async fn update_without_file_keeps_stored_image() {
    let id = Uuid::new_v4();
    let mut repo = MockProjectRepo::new();
    // No media expectations: any provider call would panic the test.
    let media = MockMedia::new();

    let existing = sample_project(id);
    repo.expect_get()
        .with(eq(id))
        .returning(move |_| Ok(Some(existing.clone())));

    repo.expect_update()
        .withf(|_, update| update.image == OLD_IMAGE_URL && update.title == "New Title")
        .times(1)
        .returning(|id, update| {
            let mut project = sample_project(*id);
            project.title = update.title.clone();
            project.image = update.image.clone();
            Ok(project)
        });

    let handler = ProjectHandler::new(repo, media);
    let fields = RawProjectFields {
        title: Some("New Title".to_string()),
        ..Default::default()
    };

    let updated = handler.update(&id.to_string(), fields, None).await.unwrap();
    assert_eq!(updated.project.image, OLD_IMAGE_URL);
    assert!(updated.cleanup.is_none());
}

#[tokio::test]
async fn update_with_file_replaces_and_cleans_up_old_object() {
    let id = Uuid::new_v4();
    let mut repo = MockProjectRepo::new();
    let mut media = MockMedia::new();

    let existing = sample_project(id);
    repo.expect_get()
        .with(eq(id))
        .returning(move |_| Ok(Some(existing.clone())));

    media
        .expect_upload()
        .times(1)
        .returning(|_, _| Ok(stored(NEW_IMAGE_URL)));
    media
        .expect_delete()
        .with(eq("portfolio-projects/old"), eq(MediaKind::Image))
        .times(1)
        .returning(|_, _| Ok(()));

    repo.expect_update()
        .withf(|_, update| update.image == NEW_IMAGE_URL)
        .times(1)
        .returning(|id, update| {
            let mut project = sample_project(*id);
            project.image = update.image.clone();
            Ok(project)
        });

    let handler = ProjectHandler::new(repo, media);
    let updated = handler
        .update(&id.to_string(), RawProjectFields::default(), Some(jpeg_upload()))
        .await
        .unwrap();

    assert_eq!(updated.project.image, NEW_IMAGE_URL);
    assert_eq!(updated.cleanup, Some(CleanupOutcome::Deleted));
}

#[tokio::test]
async fn failed_cleanup_does_not_fail_the_update() {
    let id = Uuid::new_v4();
    let mut repo = MockProjectRepo::new();
    let mut media = MockMedia::new();

    let existing = sample_project(id);
    repo.expect_get()
        .with(eq(id))
        .returning(move |_| Ok(Some(existing.clone())));

    media
        .expect_upload()
        .times(1)
        .returning(|_, _| Ok(stored(NEW_IMAGE_URL)));
    media
        .expect_delete()
        .times(1)
        .returning(|_, _| Err(AppError::Internal("provider down".to_string())));

    repo.expect_update()
        .times(1)
        .returning(|id, update| {
            let mut project = sample_project(*id);
            project.image = update.image.clone();
            Ok(project)
        });

    let handler = ProjectHandler::new(repo, media);
    let updated = handler
        .update(&id.to_string(), RawProjectFields::default(), Some(jpeg_upload()))
        .await
        .unwrap();

    assert!(matches!(updated.cleanup, Some(CleanupOutcome::Failed(_))));
}

#[tokio::test]
async fn delete_of_missing_record_skips_media_provider() {
    let id = Uuid::new_v4();
    let mut repo = MockProjectRepo::new();
    let media = MockMedia::new();

    repo.expect_get().with(eq(id)).returning(|_| Ok(None));

    let handler = ProjectHandler::new(repo, media);
    let err = handler.delete(&id.to_string()).await.unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn delete_removes_record_and_remote_object() {
    let id = Uuid::new_v4();
    let mut repo = MockProjectRepo::new();
    let mut media = MockMedia::new();

    let existing = sample_project(id);
    repo.expect_get()
        .with(eq(id))
        .returning(move |_| Ok(Some(existing.clone())));
    repo.expect_delete().with(eq(id)).times(1).returning(|_| Ok(()));

    media
        .expect_delete()
        .with(eq("portfolio-projects/old"), eq(MediaKind::Image))
        .times(1)
        .returning(|_, _| Ok(()));

    let handler = ProjectHandler::new(repo, media);
    let cleanup = handler.delete(&id.to_string()).await.unwrap();

    assert_eq!(cleanup, CleanupOutcome::Deleted);
}
