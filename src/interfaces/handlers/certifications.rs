use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;
use tracing::instrument;

use crate::{
    entities::certification::{CertificationFilter, CertificationForm, CertificationSort},
    entities::project::SortDirection,
    errors::AppError,
    use_cases::extractors::AuthClaims,
    utils::pagination::{PageParams, DEFAULT_PAGE_SIZE},
    AppState,
};

use super::{read_upload, request_base_url};

// Certification records carry the heavy derived preview payload, so the
// list endpoint caps pages at 50 instead of the shared maximum.
pub const CERTIFICATION_MAX_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl CertificationListQuery {
    fn filter(&self) -> CertificationFilter {
        CertificationFilter {
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
pub async fn list_certifications(
    state: web::Data<AppState>,
    query: web::Query<CertificationListQuery>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    let params = PageParams::from_query(
        query.page.as_deref(),
        query.limit.as_deref(),
        DEFAULT_PAGE_SIZE,
        CERTIFICATION_MAX_PAGE_SIZE,
    );
    let sort = CertificationSort::from_query(query.sort_by.as_deref());
    let direction = SortDirection::from_query(query.sort_order.as_deref());

    let page = state
        .certification_handler
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
pub async fn get_certification(
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let certification = state.certification_handler.get(&id).await?;
    Ok(HttpResponse::Ok().json(certification))
}

#[instrument(skip(_claims, state, form))]
pub async fn create_certification(
    _claims: AuthClaims,
    state: web::Data<AppState>,
    form: MultipartForm<CertificationForm>,
) -> Result<impl Responder, AppError> {
    let (fields, file) = form.into_inner().into_parts();

    let upload = match file {
        Some(file) => Some(read_upload(file).await?),
        None => None,
    };

    let certification = state.certification_handler.create(fields, upload).await?;
    Ok(HttpResponse::Created().json(certification))
}

#[instrument(skip(_claims, state, form))]
pub async fn update_certification(
    _claims: AuthClaims,
    id: web::Path<String>,
    state: web::Data<AppState>,
    form: MultipartForm<CertificationForm>,
) -> Result<impl Responder, AppError> {
    let (fields, file) = form.into_inner().into_parts();

    let upload = match file {
        Some(file) => Some(read_upload(file).await?),
        None => None,
    };

    let updated = state
        .certification_handler
        .update(&id, fields, upload)
        .await?;
    Ok(HttpResponse::Ok().json(updated.certification))
}

#[instrument(skip(_claims, state))]
pub async fn delete_certification(
    _claims: AuthClaims,
    id: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    state.certification_handler.delete(&id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Certification deleted successfully"
    })))
}
