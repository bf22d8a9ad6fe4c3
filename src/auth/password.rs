use crate::error::AuthError;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};

/// Accounts are provisioned outside this service; hashing is only needed to seed tests.
#[cfg(test)]
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Crypto(e.to_string()))
}

pub fn verify_password(password: &str, hashed: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hashed).map_err(|e| AuthError::Crypto(e.to_string()))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}
