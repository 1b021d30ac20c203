use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, Header, TokenData, Validation};

use crate::entities::token::Claims;
use crate::entities::user::User;
use crate::errors::AuthError;
use crate::settings::{AppConfig, JwtKeys};

const JWT_ALGORITHM: Algorithm = Algorithm::HS512;

/// Issues and verifies the signed, time-limited admin tokens carried in
/// the Authorization header.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    expiration: Duration,
}

impl JwtService {
    pub fn new(config: &AppConfig) -> Self {
        JwtService {
            keys: JwtKeys::from(config),
            expiration: Duration::minutes(config.jwt_expiration_minutes),
        }
    }

    pub fn create_jwt(&self, user: &User) -> Result<String, AuthError> {
        let now = Utc::now();
        let exp = (now + self.expiration).timestamp() as usize;

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            exp,
            iat: now.timestamp() as usize,
        };

        encode(&Header::new(JWT_ALGORITHM), &claims, &self.keys.encoding).map_err(AuthError::from)
    }

    pub fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.validate_exp = true;

        decode::<Claims>(token, &self.keys.decoding, &validation).map_err(AuthError::from)
    }
}

/// Token operations the auth service depends on; kept behind a trait so
/// tests can substitute their own issuer.
pub trait TokenService: Send + Sync {
    fn create_jwt(&self, user: &User) -> Result<String, AuthError>;
    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError>;
}

impl TokenService for JwtService {
    fn create_jwt(&self, user: &User) -> Result<String, AuthError> {
        self.create_jwt(user)
    }

    fn decode_jwt(&self, token: &str) -> Result<TokenData<Claims>, AuthError> {
        self.decode_jwt(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::AppEnvironment;
    use uuid::Uuid;

    fn test_config() -> AppConfig {
        AppConfig {
            env: AppEnvironment::Testing,
            name: "test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            worker_count: 1,
            database_url: "postgres://unused".to_string(),
            cors_allowed_origins: vec![],
            jwt_secret: "a-test-secret-that-is-long-enough-to-sign".to_string(),
            jwt_expiration_minutes: 60,
            cloudinary_cloud_name: "demo".to_string(),
            cloudinary_api_key: String::new(),
            cloudinary_api_secret: String::new(),
        }
    }

    fn test_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "admin@test.com".to_string(),
            password_hash: String::new(),
            name: "Admin".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn issue_and_decode_round_trip() {
        let service = JwtService::new(&test_config());
        let user = test_user();

        let token = service.create_jwt(&user).unwrap();
        let decoded = service.decode_jwt(&token).unwrap();

        assert_eq!(decoded.claims.sub, user.id.to_string());
        assert_eq!(decoded.claims.email, user.email);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let service = JwtService::new(&test_config());
        let mut token = service.create_jwt(&test_user()).unwrap();
        token.push('x');

        assert!(service.decode_jwt(&token).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let service = JwtService::new(&test_config());

        let mut other_config = test_config();
        other_config.jwt_secret = "a-different-secret-also-long-enough!!".to_string();
        let other = JwtService::new(&other_config);

        let token = other.create_jwt(&test_user()).unwrap();
        assert!(service.decode_jwt(&token).is_err());
    }
}
