use crate::{
    auth::jwt::{bearer_token, verify_token},
    config::Config,
    error::{AppError, AuthError},
    models::TokenType,
};
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

/// Identity of the caller, taken from a valid access token.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
}

impl AuthUser {
    pub fn from_access_token(token: &str, secret: &str) -> Result<Self, AuthError> {
        let claims = verify_token(token, secret)?;
        if claims.token_type != TokenType::Access {
            return Err(AuthError::WrongTokenType);
        }
        Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.sub,
        })
    }
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // already resolved by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        let result = match req.app_data::<Data<Config>>() {
            Some(config) => bearer_token(header)
                .and_then(|token| AuthUser::from_access_token(token, &config.jwt_secret)),
            None => Err(AuthError::Crypto("Config missing".into())),
        };

        ready(result.map_err(AppError::from))
    }
}
