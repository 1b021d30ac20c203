use validator::Validate;

use crate::auth::jwt::TokenService;
use crate::auth::password::verify_password;
use crate::entities::user::{LoginRequest, LoginResponse, PublicUser};
use crate::errors::{AppError, AuthError};
use crate::interfaces::repositories::user::UserRepository;
use crate::utils::valid_uuid::valid_uuid;

pub struct AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenService,
{
    pub user_repo: R,
    pub token_service: T,
}

impl<R, T> AuthHandler<R, T>
where
    R: UserRepository,
    T: TokenService,
{
    pub fn new(user_repo: R, token_service: T) -> Self {
        AuthHandler {
            user_repo,
            token_service,
        }
    }

    /// Logs in the administrator by validating credentials and issuing a
    /// token. Unknown email and wrong password produce the identical
    /// error, so the response never reveals which one happened.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        request.validate()?;

        let user = self
            .user_repo
            .get_user_by_email(&request.email)
            .await
            .map_err(|_| AuthError::WrongCredentials)?
            .ok_or(AuthError::WrongCredentials)?;

        let is_password_valid = verify_password(&request.password, &user.password_hash)
            .map_err(|_| AuthError::WrongCredentials)?;
        if !is_password_valid {
            return Err(AuthError::WrongCredentials);
        }

        let token = self.token_service.create_jwt(&user).map_err(|e| {
            tracing::warn!("Failed to create JWT: {}", e);
            AuthError::TokenCreation
        })?;

        tracing::info!("Admin logged in successfully");
        Ok(LoginResponse {
            token,
            user: user.into(),
        })
    }

    /// Returns the profile behind a verified token's subject claim.
    pub async fn me(&self, user_id: &str) -> Result<PublicUser, AppError> {
        let id = valid_uuid(user_id, "user")?;

        let user = self
            .user_repo
            .get_user_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }
}
