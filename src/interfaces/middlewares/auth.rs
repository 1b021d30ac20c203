use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage, HttpResponse,
};
use futures_util::future::{ok, LocalBoxFuture, Ready};
use std::{
    rc::Rc,
    task::{Context, Poll},
};

use crate::{entities::token::Claims, errors::AuthError, AppState};

/// Gate in front of every route: public reads pass through untouched,
/// everything else must carry a valid bearer token. Verified claims are
/// stashed in the request extensions for the `AuthClaims` extractor.
pub struct AuthMiddleware;

impl<S> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let path = req.path();
            let method = req.method().as_str();

            if is_public_route(path, method) {
                return service.call(req).await;
            }

            let claims = match get_valid_claims(&req) {
                Ok(claims) => claims,
                Err(AuthError::MissingCredentials) => {
                    tracing::warn!("Missing or malformed Authorization header");
                    return Ok(error_response(req, AuthError::MissingCredentials));
                }
                Err(AuthError::TokenExpired) => {
                    return Ok(error_response(req, AuthError::TokenExpired));
                }
                Err(AuthError::MissingJwtService) => {
                    tracing::error!("AppState missing in middleware");
                    return Ok(error_response(req, AuthError::MissingJwtService));
                }
                Err(_) => {
                    tracing::warn!("Rejected invalid token");
                    return Ok(error_response(req, AuthError::InvalidToken));
                }
            };

            req.extensions_mut().insert(claims);
            service.call(req).await
        })
    }
}

/// Reads and writes on auth-exempt paths. Every write to projects and
/// certifications stays protected.
fn is_public_route(path: &str, method: &str) -> bool {
    if method == "OPTIONS" {
        return true;
    }

    if matches!((path, method), ("/", "GET") | ("/auth/login", "POST")) {
        return true;
    }

    method == "GET" && (path.starts_with("/projects") || path.starts_with("/certifications"))
}

fn extract_token(req: &ServiceRequest) -> Option<String> {
    req.headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| {
            let parts: Vec<&str> = header.split_whitespace().collect();
            if parts.len() == 2 && parts[0].eq_ignore_ascii_case("bearer") {
                Some(parts[1].to_string())
            } else {
                None
            }
        })
}

fn get_valid_claims(req: &ServiceRequest) -> Result<Claims, AuthError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or(AuthError::MissingJwtService)?;

    let token = extract_token(req).ok_or(AuthError::MissingCredentials)?;
    let decoded = state.auth_handler.token_service.decode_jwt(&token)?;
    Ok(decoded.claims)
}

fn error_response(req: ServiceRequest, error: AuthError) -> ServiceResponse<BoxBody> {
    use actix_web::ResponseError;
    let response: HttpResponse = error.error_response();
    req.into_response(response)
}

#[cfg(test)]
mod tests {
    use super::is_public_route;

    #[test]
    fn reads_are_public_writes_are_not() {
        assert!(is_public_route("/", "GET"));
        assert!(is_public_route("/auth/login", "POST"));
        assert!(is_public_route("/projects", "GET"));
        assert!(is_public_route("/projects/abc", "GET"));
        assert!(is_public_route("/certifications", "GET"));
        assert!(is_public_route("/projects", "OPTIONS"));

        assert!(!is_public_route("/projects", "POST"));
        assert!(!is_public_route("/projects/abc", "PUT"));
        assert!(!is_public_route("/certifications/abc", "DELETE"));
        assert!(!is_public_route("/auth/me", "GET"));
    }
}
