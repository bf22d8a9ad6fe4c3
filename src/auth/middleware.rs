use crate::auth::auth::AuthUser;
use crate::auth::jwt::bearer_token;
use crate::config::Config;
use crate::error::AppError;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, ResponseError,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};

/// Rejects requests without a valid access token; stores [`AuthUser`] in the
/// request extensions otherwise.
pub async fn auth_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok());

    let user = match bearer_token(header)
        .and_then(|token| AuthUser::from_access_token(token, &config.jwt_secret))
    {
        Ok(user) => user,
        Err(e) => {
            tracing::debug!(error = %e, path = %req.path(), "Rejected unauthenticated request");
            let resp = AppError::from(e).error_response();
            return Ok(req.into_response(resp));
        }
    };

    req.extensions_mut().insert(user);

    next.call(req).await
}
