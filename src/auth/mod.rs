pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{issue_token, verify_token, Claims, JwtConfig};

/// Form-encoded login credentials (OAuth2 password-flow field names).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// The user's email address.
    pub username: String,
    pub password: String,
}

/// Payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, 1 to 256 characters.
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(email, length(max = 256))]
    pub email: String,
    /// At least 6 characters.
    #[validate(length(min = 6))]
    pub password: String,
    /// Must repeat `password` exactly.
    pub confirm_password: String,
}

/// Payload for `PUT /auth/me`: a full replacement of the caller's profile.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 256))]
    pub name: String,
    #[validate(email, length(max = 256))]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub confirm_password: String,
    pub is_active: bool,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".into(),
        }
    }
}

/// Rejects a password/confirmation pair that differs.
pub fn ensure_passwords_match(password: &str, confirmation: &str) -> Result<(), AppError> {
    if password != confirmation {
        return Err(AppError::BadRequest("Passwords do not match".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    fn register(name: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: password.into(),
        }
    }

    #[test]
    fn test_register_request_validation() {
        assert!(register("Ana Lima", "ana@example.com", "password123")
            .validate()
            .is_ok());
        assert!(register("", "ana@example.com", "password123")
            .validate()
            .is_err());
        assert!(register("Ana", "anaexample.com", "password123")
            .validate()
            .is_err());
        assert!(register("Ana", "ana@example.com", "123").validate().is_err());
    }

    #[test]
    fn test_password_confirmation() {
        assert!(ensure_passwords_match("secret1", "secret1").is_ok());
        assert!(matches!(
            ensure_passwords_match("secret1", "secret2"),
            Err(AppError::BadRequest(msg)) if msg == "Passwords do not match"
        ));
    }

    #[test]
    fn test_token_response_is_bearer() {
        let response = TokenResponse::bearer("abc".into());
        assert_eq!(response.token_type, "bearer");
        assert_eq!(response.access_token, "abc");
    }
}
