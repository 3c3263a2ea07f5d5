use crate::auth::PasswordService;
use crate::domain::{DomainError, DomainResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Argon2id hashes in PHC string format
#[derive(Default)]
pub struct Argon2PasswordService;

impl Argon2PasswordService {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordService for Argon2PasswordService {
    fn hash_password(&self, password: &str) -> DomainResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::PasswordHashingError(e.to_string()))
    }

    fn verify_password(&self, password: &str, hash: &str) -> DomainResult<bool> {
        let parsed_hash = argon2::PasswordHash::new(hash)
            .map_err(|e| DomainError::PasswordHashingError(e.to_string()))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
