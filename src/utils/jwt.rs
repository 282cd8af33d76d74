use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,       // user id
    pub email: String,
    pub role: Option<UserRole>,
    pub exp: i64,        // expiration timestamp
    pub iat: i64,        // issued at timestamp
}

pub fn create_token(
    user_id: Uuid,
    email: &str,
    role: Option<UserRole>,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
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

    #[test]
    fn test_token_carries_role() {
        let id = Uuid::new_v4();
        let token = create_token(id, "mech@fleet.local", Some(UserRole::Mechanic), "secret", 1).unwrap();
        let claims = verify_token(&token, "secret").unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.role, Some(UserRole::Mechanic));
    }

    #[test]
    fn test_token_without_role() {
        let token = create_token(Uuid::new_v4(), "new@fleet.local", None, "secret", 1).unwrap();
        assert_eq!(verify_token(&token, "secret").unwrap().role, None);
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token = create_token(Uuid::new_v4(), "x@fleet.local", None, "secret", 1).unwrap();
        assert!(matches!(verify_token(&token, "other"), Err(AppError::Unauthorized(_))));
    }
}
