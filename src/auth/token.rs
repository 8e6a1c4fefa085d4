use std::fmt;

use crate::error::AppError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// The only token type this service issues.
pub const ACCESS_TOKEN_TYPE: &str = "access_token";

/// Signing settings for bearer tokens.
#[derive(Clone)]
pub struct JwtConfig {
    secret: String,
    algorithm: Algorithm,
    expiration: chrono::Duration,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, algorithm: Algorithm, expiration: chrono::Duration) -> Self {
        Self {
            secret: secret.into(),
            algorithm,
            expiration,
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Lifetime of a freshly issued token.
    pub fn expiration(&self) -> chrono::Duration {
        self.expiration
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token: the user's email address.
    pub sub: String,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    #[serde(rename = "type")]
    pub token_type: String,
}

/// Issues an access token for the user identified by `email`.
///
/// # Returns
/// The encoded JWT, or `AppError::InternalServerError` if signing fails.
pub fn issue_token(email: &str, config: &JwtConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(config.expiration)
        .ok_or_else(|| AppError::InternalServerError("Token expiration overflow".into()))?;

    let claims = Claims {
        sub: email.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
        token_type: ACCESS_TOKEN_TYPE.to_string(),
    };

    encode(&Header::new(config.algorithm), &claims, &config.encoding_key())
        .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies a JWT string and decodes its claims.
///
/// The signature, algorithm and expiry are checked with no leeway.
///
/// # Returns
/// The decoded `Claims`, or `AppError::Unauthorized` if the token is malformed, its
/// signature is invalid, it has expired or it is not an access token.
pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::new(config.algorithm);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let claims = decode::<Claims>(token, &config.decoding_key(), &validation)
        .map(|data| data.claims)
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {:?}", e.kind())))?;

    if claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(AppError::Unauthorized("Invalid token: wrong token type".into()));
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig::new(secret, Algorithm::HS256, chrono::Duration::minutes(30))
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_token_generation_and_verification() {
        let config = config("test_secret_for_gen_verify");
        let token = issue_token("ana@example.com", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, "ana@example.com");
        assert_eq!(claims.token_type, ACCESS_TOKEN_TYPE);
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn test_token_expiration() {
        let config = config("test_secret_for_expiration");
        let issued = Utc::now() - chrono::Duration::hours(3);
        let expired = Claims {
            sub: "ana@example.com".into(),
            iat: issued.timestamp(),
            exp: (issued + chrono::Duration::hours(1)).timestamp(),
            token_type: ACCESS_TOKEN_TYPE.into(),
        };
        let token = sign(&expired, "test_secret_for_expiration");

        match verify_token(&token, &config) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("ExpiredSignature"), "{}", msg),
            other => panic!("expected expired token to be rejected, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_token_signature() {
        let token = issue_token("ana@example.com", &config("one_secret")).unwrap();

        match verify_token(&token, &config("a_completely_different_secret")) {
            Err(AppError::Unauthorized(msg)) => assert!(msg.contains("InvalidSignature"), "{}", msg),
            other => panic!("expected signature mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let config = config("tamper_secret");
        let token = issue_token("ana@example.com", &config).unwrap();
        let forged = issue_token("root@example.com", &config).unwrap();

        // Graft the payload of one token onto the signature of another.
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert!(matches!(
            verify_token(&tampered, &config),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_malformed_token_and_wrong_type() {
        let config = config("shape_secret");
        assert!(matches!(
            verify_token("not-a-jwt", &config),
            Err(AppError::Unauthorized(_))
        ));

        let now = Utc::now();
        let refresh = Claims {
            sub: "ana@example.com".into(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::minutes(5)).timestamp(),
            token_type: "refresh_token".into(),
        };
        let token = sign(&refresh, "shape_secret");
        assert!(matches!(
            verify_token(&token, &config),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", config("super-secret-value"));
        assert!(!rendered.contains("super-secret-value"));
    }
}
