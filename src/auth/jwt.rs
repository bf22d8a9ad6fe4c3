use crate::{
    error::AuthError,
    models::{Claims, TokenType},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    chrono::Utc::now().timestamp().max(0) as usize
}

fn sign(claims: &Claims, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Crypto(e.to_string()))
}

fn new_claims(user_id: u64, email: String, ttl: usize, token_type: TokenType) -> Claims {
    Claims {
        user_id,
        sub: email,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
    }
}

pub fn generate_access_token(
    user_id: u64,
    email: String,
    secret: &str,
    ttl: usize,
) -> Result<String, AuthError> {
    sign(&new_claims(user_id, email, ttl, TokenType::Access), secret)
}

pub fn generate_refresh_token(
    user_id: u64,
    email: String,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), AuthError> {
    let claims = new_claims(user_id, email, ttl, TokenType::Refresh);
    let token = sign(&claims, secret)?;
    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

/// `Authorization: Bearer <token>` → `<token>`
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    header
        .ok_or(AuthError::MissingToken)?
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_token_round_trips_claims() {
        let token = generate_access_token(7, "sari@example.com".into(), "s3cret", 60).unwrap();
        let claims = verify_token(&token, "s3cret").unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.sub, "sari@example.com");
        assert_eq!(claims.token_type, TokenType::Access);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let (token, _) = generate_refresh_token(7, "a@b.c".into(), "one", 60).unwrap();
        assert!(matches!(
            verify_token(&token, "two"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn bearer_prefix_required() {
        assert_eq!(bearer_token(Some("Bearer abc")).unwrap(), "abc");
        assert!(matches!(bearer_token(None), Err(AuthError::MissingToken)));
        assert!(matches!(
            bearer_token(Some("Token abc")),
            Err(AuthError::InvalidToken)
        ));
    }
}
