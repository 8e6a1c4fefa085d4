use crate::error::AppError;

/// bcrypt work factor for stored user passwords.
pub const PASSWORD_HASH_COST: u32 = 12;

/// Salts and hashes a plaintext password for storage.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    bcrypt::hash(password, PASSWORD_HASH_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored hash.
///
/// A stored value that is not a bcrypt hash counts as a mismatch rather than a
/// server error, so a corrupt row cannot be told apart from a wrong password.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, AppError> {
    match bcrypt::verify(password, stored_hash) {
        Ok(matches) => Ok(matches),
        Err(bcrypt::BcryptError::InvalidHash(_))
        | Err(bcrypt::BcryptError::InvalidPrefix(_))
        | Err(bcrypt::BcryptError::InvalidBase64(_)) => {
            log::warn!("Stored password hash is malformed");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}
