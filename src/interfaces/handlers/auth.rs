use actix_web::{get, post, web, HttpResponse, Responder};

use crate::{
    entities::user::LoginRequest,
    errors::{AppError, AuthError},
    use_cases::extractors::AuthClaims,
    AppState,
};

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    data: web::Json<LoginRequest>,
) -> Result<impl Responder, AuthError> {
    let response = state.auth_handler.login(data.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[get("/me")]
pub async fn me(claims: AuthClaims, state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    let user = state.auth_handler.me(&claims.0.sub).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": user })))
}
