use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub exp: usize,
    pub iat: usize,
    pub username: String,
}

pub fn sign_token(
    user_id: Uuid,
    role: &str,
    username: &str,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = Duration::try_hours(ttl_hours)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or_else(|| AppError::internal(format!("Token lifetime out of range: {ttl_hours}h")))?;
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iat: now.timestamp() as usize,
        exp: exp.timestamp() as usize,
        username: username.to_string(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AppError::internal(format!("Token signing failed: {e}")))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &Validation::new(Algorithm::HS256))
        .map(|d| d.claims)
        .map_err(|e| {
            tracing::debug!(error = %e, "rejected token");
            AppError::Unauthorized
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_token_verifies_with_same_secret() {
        let id = Uuid::now_v7();
        let token = sign_token(id, "admin", "sam", "secret-a", 1).unwrap();
        let claims = verify_token(&token, "secret-a").unwrap();
        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.username, "sam");
        assert!(claims.exp > claims.iat);

        assert!(matches!(verify_token(&token, "secret-b"), Err(AppError::Unauthorized)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = sign_token(Uuid::now_v7(), "member", "sam", "k", -2).unwrap();
        assert!(verify_token(&token, "k").is_err());
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        let result = sign_token(Uuid::now_v7(), "member", "sam", "k", 1_000_000_000_000_000);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
