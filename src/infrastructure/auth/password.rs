use argon2::{
    password_hash::{
        rand_core::OsRng, Error as Argon2Error, PasswordHash, PasswordHasher, PasswordVerifier,
        SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::errors::AuthError;

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15_000, 2, 1, None).map_err(|_| AuthError::TokenCreation)?,
    );

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::TokenCreation)
}

pub fn verify_password(password: &str, hashed: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hashed).map_err(|_| AuthError::WrongCredentials)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(Argon2Error::Password) => Ok(false),
        Err(_) => Err(AuthError::WrongCredentials),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("hunter2-but-longer").unwrap();
        assert!(verify_password("hunter2-but-longer", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }
}
