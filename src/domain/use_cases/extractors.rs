use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::{entities::token::Claims, errors::AuthError};

/// Extractor for authenticated claims, ensuring the caller presented a
/// valid token. Returns 401 otherwise.
/// Usage: add `claims: AuthClaims` as a parameter to your handler function.
#[derive(Debug)]
pub struct AuthClaims(pub Claims);

impl FromRequest for AuthClaims {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthClaims(claims.clone()))),
            None => ready(Err(AuthError::MissingCredentials.into())),
        }
    }
}
