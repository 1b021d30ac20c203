use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::project::{ProjectFilter, ProjectForm, ProjectSort, SortDirection},
    errors::AppError,
    use_cases::extractors::AuthClaims,
    utils::pagination::{PageParams, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    AppState,
};

use super::{read_upload, request_base_url};

/// All fields arrive as strings so a malformed number degrades to the
/// default instead of rejecting the whole request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub featured: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ProjectListQuery {
    fn filter(&self) -> ProjectFilter {
        ProjectFilter {
            featured: match self.featured.as_deref() {
                Some("true") => Some(true),
                Some("false") => Some(false),
                _ => None,
            },
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        }
    }
}

#[instrument(skip(state, query, req))]
pub async fn list_projects(
    state: web::Data<AppState>,
    query: web::Query<ProjectListQuery>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let params = PageParams::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        DEFAULT_PAGE_SIZE,
        MAX_PAGE_SIZE,
    );
    let sort = ProjectSort::from_query(query.sort_by.as_deref());
    let direction = SortDirection::from_query(query.sort_order.as_deref());

    let page = state
        .project_handler
        .list(
            params,
            query.filter(),
            sort,
            direction,
            &request_base_url(&req),
        )
        .await?;

    Ok(HttpResponse::Ok().json(page))
}

#[instrument(skip(state))]
pub async fn get_project(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let project = state.project_handler.get(&id).await?;
    Ok(HttpResponse::Ok().json(project))
}

#[instrument(skip(_claims, state, form))]
pub async fn create_project(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    form: MultipartForm<ProjectForm>,
) -> Result<impl Responder, AppError> {
    let (fields, file) = form.into_inner().into_parts();

    let upload = match file {
        Some(file) => Some(read_upload(file).await?),
        None => None,
    };

    let project = state.project_handler.create(fields, upload).await?;
    Ok(HttpResponse::Created().json(project))
}

#[instrument(skip(_claims, state, form))]
pub async fn update_project(
    _claims: AuthClaims,
    id: web::Path<String>,
    state: web::Data<AppState>,
    form: MultipartForm<ProjectForm>,
) -> Result<impl Responder, AppError> {
    let (fields, file) = form.into_inner().into_parts();

    let upload = match file {
        Some(file) => Some(read_upload(file).await?),
        None => None,
    };

    let updated = state.project_handler.update(&id, fields, upload).await?;
    Ok(HttpResponse::Ok().json(updated.project))
}

#[instrument(skip(_claims, state))]
pub async fn delete_project(
    _claims: AuthClaims,
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.project_handler.delete(&id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Project deleted successfully"
    })))
}
