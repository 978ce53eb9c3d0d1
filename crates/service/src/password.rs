//! One-way salted password hashing applied before a user row is written.

use argon2::{password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString}, Argon2};
use rand::rngs::OsRng;

use crate::errors::ServiceError;

/// Hash a plain-text password into an argon2 PHC string.
///
/// # Examples
/// ```
/// use service::password::{hash_password, verify_password};
/// let hash = hash_password("Secret123").unwrap();
/// assert!(hash.starts_with("$argon2"));
/// assert!(verify_password("Secret123", &hash).unwrap());
/// ```
pub fn hash_password(plain: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| ServiceError::Hash(e.to_string()))?
        .to_string();
    Ok(hash)
}

/// Check a plain-text password against a stored PHC string.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool, ServiceError> {
    let parsed = PasswordHash::new(hash).map_err(|e| ServiceError::Hash(e.to_string()))?;
    Ok(Argon2::default().verify_password(plain.as_bytes(), &parsed).is_ok())
}
