use async_trait::async_trait;
use sqlx::{types::Json, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::certification::{
        Certification, CertificationFilter, CertificationInsert, CertificationSort,
        CertificationUpdate,
    },
    entities::project::SortDirection,
    errors::AppError,
    repositories::sqlx_repo::SqlxCertificationRepo,
    utils::pagination::PageParams,
};

#[async_trait]
pub trait CertificationRepository: Send + Sync {
    async fn count(&self, filter: &CertificationFilter) -> Result<i64, AppError>;
    async fn list(
        &self,
        filter: &CertificationFilter,
        sort: CertificationSort,
        direction: SortDirection,
        params: &PageParams,
    ) -> Result<Vec<Certification>, AppError>;
    async fn get(&self, id: &Uuid) -> Result<Option<Certification>, AppError>;
    async fn insert(&self, certification: &CertificationInsert) -> Result<Certification, AppError>;
    async fn update(
        &self,
        id: &Uuid,
        certification: &CertificationUpdate,
    ) -> Result<Certification, AppError>;
    async fn delete(&self, id: &Uuid) -> Result<(), AppError>;
}

impl SqlxCertificationRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxCertificationRepo { pool }
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &CertificationFilter) {
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        builder.push(" AND (title ILIKE ").push_bind(pattern.clone());
        builder.push(" OR issuer ILIKE ").push_bind(pattern.clone());
        builder
            .push(" OR array_to_string(skills, ' ') ILIKE ")
            .push_bind(pattern);
        builder.push(")");
    }
}

#[async_trait]
impl CertificationRepository for SqlxCertificationRepo {
    async fn count(&self, filter: &CertificationFilter) -> Result<i64, AppError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM certifications WHERE 1=1");
        push_filter(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list(
        &self,
        filter: &CertificationFilter,
        sort: CertificationSort,
        direction: SortDirection,
        params: &PageParams,
    ) -> Result<Vec<Certification>, AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM certifications WHERE 1=1");
        push_filter(&mut builder, filter);

        builder.push(" ORDER BY ");
        builder.push(sort.order_by(direction));
        builder.push(" LIMIT ").push_bind(params.limit);
        builder.push(" OFFSET ").push_bind(params.skip());

        builder
            .build_query_as::<Certification>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Certification>, AppError> {
        sqlx::query_as::<_, Certification>("SELECT * FROM certifications WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn insert(&self, certification: &CertificationInsert) -> Result<Certification, AppError> {
        sqlx::query_as::<_, Certification>(
            r#"
            INSERT INTO certifications (
                id, title, issuer, issued_at, expiration_at, credential_url,
                credential_id, skills, image, is_pdf, pdf_pages, thumbnail,
                preview_url, previews, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(certification.id)
        .bind(&certification.title)
        .bind(&certification.issuer)
        .bind(certification.issued_at)
        .bind(certification.expiration_at)
        .bind(&certification.credential_url)
        .bind(&certification.credential_id)
        .bind(&certification.skills)
        .bind(&certification.image)
        .bind(certification.derived.is_pdf)
        .bind(certification.derived.pdf_pages)
        .bind(&certification.derived.thumbnail)
        .bind(&certification.derived.preview_url)
        .bind(Json(&certification.derived.previews))
        .bind(certification.created_at)
        .bind(certification.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn update(
        &self,
        id: &Uuid,
        certification: &CertificationUpdate,
    ) -> Result<Certification, AppError> {
        sqlx::query_as::<_, Certification>(
            r#"
            UPDATE certifications
            SET title = $2,
                issuer = $3,
                issued_at = $4,
                expiration_at = $5,
                credential_url = $6,
                credential_id = $7,
                skills = $8,
                image = $9,
                is_pdf = $10,
                pdf_pages = $11,
                thumbnail = $12,
                preview_url = $13,
                previews = $14,
                updated_at = $15
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&certification.title)
        .bind(&certification.issuer)
        .bind(certification.issued_at)
        .bind(certification.expiration_at)
        .bind(&certification.credential_url)
        .bind(&certification.credential_id)
        .bind(&certification.skills)
        .bind(&certification.image)
        .bind(certification.derived.is_pdf)
        .bind(certification.derived.pdf_pages)
        .bind(&certification.derived.thumbnail)
        .bind(&certification.derived.preview_url)
        .bind(Json(&certification.derived.previews))
        .bind(certification.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM certifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Certification not found".to_string()));
        }

        Ok(())
    }
}
