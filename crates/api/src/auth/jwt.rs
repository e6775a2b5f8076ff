//! HS256 access tokens carrying the operator's identity and role.

use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use glow_core::types::{DbId, Timestamp};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Admin user id.
    pub sub: DbId,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_access_token(
    secret: &str,
    user_id: DbId,
    username: &str,
    role: &str,
    ttl_minutes: i64,
    now: Timestamp,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role: role.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
}

pub fn decode_access_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized("Invalid or expired access token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn token_round_trip() {
        let token =
            issue_access_token("secret", 7, "casey", "coach", 15, Utc::now()).unwrap();
        let claims = decode_access_token("secret", &token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "casey");
        assert_eq!(claims.role, "coach");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_access_token("secret", 7, "casey", "coach", 15, Utc::now()).unwrap();
        assert!(decode_access_token("other", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let issued_at = Utc::now() - Duration::hours(2);
        let token = issue_access_token("secret", 7, "casey", "coach", 15, issued_at).unwrap();
        assert!(decode_access_token("secret", &token).is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode_access_token("secret", "not-a-jwt").is_err());
    }
}
