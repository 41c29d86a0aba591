//! Staff JWT issuance and verification (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use adflow_core::AppError;

use super::models::JwtClaims;

pub fn issue_token(user_id: Uuid, secret: &str, expiry_hours: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + Duration::hours(expiry_hours)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> Result<JwtClaims, AppError> {
    decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-test-secret-test-secret!";

    #[test]
    fn test_token_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = issue_token(user_id, SECRET, 24).expect("issue");
        let claims = verify_token(&token, SECRET).expect("verify");
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(Uuid::new_v4(), SECRET, 24).expect("issue");
        let err = verify_token(&token, "another-secret-another-secret-ok").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue_token(Uuid::new_v4(), SECRET, -1).expect("issue");
        assert!(verify_token(&token, SECRET).is_err());
    }
}
