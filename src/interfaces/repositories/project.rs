use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    entities::project::{
        Project, ProjectFilter, ProjectInsert, ProjectSort, ProjectUpdate, SortDirection,
    },
    errors::AppError,
    repositories::sqlx_repo::SqlxProjectRepo,
    utils::pagination::PageParams,
};

#[async_trait]
pub trait ProjectRepository: Send + Sync {
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

impl SqlxProjectRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxProjectRepo { pool }
    }
}

/// Appends the WHERE predicate shared by `count` and `list`, so both
/// always agree on what a page is counted against.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ProjectFilter) {
    if let Some(featured) = filter.featured {
        builder.push(" AND featured = ").push_bind(featured);
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        builder.push(" AND (title ILIKE ").push_bind(pattern.clone());
        builder
            .push(" OR description_en ILIKE ")
            .push_bind(pattern.clone());
        builder
            .push(" OR description_id ILIKE ")
            .push_bind(pattern.clone());
        builder
            .push(" OR array_to_string(technologies, ' ') ILIKE ")
            .push_bind(pattern);
        builder.push(")");
    }
}

#[async_trait]
impl ProjectRepository for SqlxProjectRepo {
    async fn count(&self, filter: &ProjectFilter) -> Result<i64, AppError> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM projects WHERE 1=1");
        push_filter(&mut builder, filter);

        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn list(
        &self,
        filter: &ProjectFilter,
        sort: ProjectSort,
        direction: SortDirection,
        params: &PageParams,
    ) -> Result<Vec<Project>, AppError> {
        let mut builder = QueryBuilder::new("SELECT * FROM projects WHERE 1=1");
        push_filter(&mut builder, filter);

        // Allow-listed column expression, never raw query input.
        builder.push(" ORDER BY ");
        builder.push(sort.order_by(direction));
        builder.push(" LIMIT ").push_bind(params.limit);
        builder.push(" OFFSET ").push_bind(params.skip());

        builder
            .build_query_as::<Project>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Project>, AppError> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::from)
    }

    async fn insert(&self, project: &ProjectInsert) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (
                id, title, description_en, description_id, image, technologies,
                demo_url, github_url, featured, "order", created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.description_en)
        .bind(&project.description_id)
        .bind(&project.image)
        .bind(&project.technologies)
        .bind(&project.demo_url)
        .bind(&project.github_url)
        .bind(project.featured)
        .bind(project.order)
        .bind(project.created_at)
        .bind(project.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn update(&self, id: &Uuid, project: &ProjectUpdate) -> Result<Project, AppError> {
        sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET title = $2,
                description_en = $3,
                description_id = $4,
                image = $5,
                technologies = $6,
                demo_url = $7,
                github_url = $8,
                featured = $9,
                "order" = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&project.title)
        .bind(&project.description_en)
        .bind(&project.description_id)
        .bind(&project.image)
        .bind(&project.technologies)
        .bind(&project.demo_url)
        .bind(&project.github_url)
        .bind(project.featured)
        .bind(project.order)
        .bind(project.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)
    }

    async fn delete(&self, id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Project not found".to_string()));
        }

        Ok(())
    }
}
