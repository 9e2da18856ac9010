use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use taskboard_core::user::UserProfile;

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

/// Issues and verifies HS256 bearer tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user: &UserProfile) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            iat: now.timestamp() as usize,
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|err| TokenError::Signing(err.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &validation())
            .map(|decoded| decoded.claims)
            .map_err(|err| {
                tracing::debug!("Token rejected: {}", err);
                TokenError::InvalidToken
            })
    }
}

fn validation() -> Validation {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation
}
