use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::Role;
use crate::error::ApiError;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

/// Identity encoded into a token.
#[derive(Clone, Debug)]
pub struct TokenSubject<'a> {
    pub user_id: Uuid,
    pub email: &'a str,
    pub name: &'a str,
    pub role: Role,
}

/// Sign an HS256 token valid for `expiry_hours`.
pub fn generate_jwt_token(
    subject: &TokenSubject<'_>,
    jwt_secret: &str,
    expiry_hours: i64,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: subject.user_id.to_string(),
        email: subject.email.to_string(),
        name: subject.name.to_string(),
        role: subject.role,
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(expiry_hours)).timestamp() as usize,
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )?;
    Ok(token)
}

pub fn verify_jwt_token(token: &str, jwt_secret: &str) -> Result<Claims, ApiError> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_jwt_secret_minimum_32_characters_long";

    fn subject(user_id: Uuid) -> TokenSubject<'static> {
        TokenSubject {
            user_id,
            email: "medic@example.com",
            name: "Dr. Test",
            role: Role::Medic,
        }
    }

    #[test]
    fn test_generate_and_verify_jwt_token() {
        let user_id = Uuid::new_v4();
        let token = generate_jwt_token(&subject(user_id), SECRET, 24).unwrap();

        let claims = verify_jwt_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, Role::Medic);
        assert_eq!(claims.name, "Dr. Test");
        assert!((86390..=86410).contains(&(claims.exp - claims.iat)));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = generate_jwt_token(&subject(Uuid::new_v4()), SECRET, 24).unwrap();
        let result = verify_jwt_token(&token, "wrong_jwt_secret_minimum_32_characters_long");
        assert!(matches!(result, Err(ApiError::Jwt(_))));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = generate_jwt_token(&subject(Uuid::new_v4()), SECRET, -2).unwrap();
        assert!(verify_jwt_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Root).unwrap(), "\"ROOT\"");
        let role: Role = serde_json::from_str("\"MEDIC\"").unwrap();
        assert_eq!(role, Role::Medic);
    }
}
