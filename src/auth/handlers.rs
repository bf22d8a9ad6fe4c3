use crate::{
    api::profile::load_profile,
    auth::{
        auth::AuthUser,
        jwt::{bearer_token, generate_access_token, generate_refresh_token, verify_token},
        password::verify_password,
        session::SessionEvent,
    },
    config::Config,
    error::{AppError, AuthError, ValidationError},
    models::{LoginReqDto, LoginResponse, TokenPair, TokenType},
    state::AppState,
};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use serde_json::json;
use tracing::{debug, error, info, instrument};

/// Issues a fresh access/refresh pair and records the refresh `jti`.
async fn issue_tokens(
    state: &AppState,
    config: &Config,
    user_id: u64,
    email: &str,
) -> Result<TokenPair, AppError> {
    let access_token = generate_access_token(
        user_id,
        email.to_string(),
        &config.jwt_secret,
        config.access_token_ttl,
    )?;

    let (refresh_token, refresh_claims) = generate_refresh_token(
        user_id,
        email.to_string(),
        &config.jwt_secret,
        config.refresh_token_ttl,
    )?;

    debug!(user_id, jti = %refresh_claims.jti, "Storing refresh token");
    state
        .credentials
        .store_refresh_token(user_id, &refresh_claims.jti, refresh_claims.exp as i64)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to store refresh token");
            e
        })?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn authorization(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 400, description = "Email or password missing"),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "error": "Email atau kata sandi tidak valid",
            "redirect": "/login"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Session"
)]
#[instrument(
    name = "auth_login",
    skip(state, config, payload),
    fields(email = %payload.email)
)]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    info!("Login request received");

    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        info!("Validation failed: empty email or password");
        return Err(ValidationError::InvalidField {
            field: "credentials",
            reason: "email and password are required",
        }
        .into());
    }

    let credential = match state.credentials.find_by_email(email).await {
        Ok(Some(c)) => {
            debug!(user_id = c.id, "User found");
            c
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return Err(AuthError::InvalidCredentials.into());
        }
        Err(e) => {
            error!(error = %e, "Store error while fetching user");
            return Err(e.into());
        }
    };

    if let Err(e) = verify_password(&payload.password, &credential.password_hash) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(e.into());
    }

    let tokens = issue_tokens(&state, &config, credential.id, &credential.email).await?;

    // missing profile row does not block sign-in
    let profile = load_profile(&state, credential.id).await.unwrap_or_else(|e| {
        error!(error = %e, user_id = credential.id, "Failed to load profile after login");
        None
    });

    state.sessions.publish(SessionEvent::SignedIn {
        user_id: credential.id,
        email: credential.email.clone(),
    });
    info!(user_id = credential.id, "Login successful");

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        profile,
    }))
}

/// Current session (identity and profile)
#[utoipa::path(
    get,
    path = "/api/session",
    responses(
        (status = 200, description = "Active session", body = Object, example = json!({
            "user_id": 42,
            "email": "ahmad.firdaus@example.com",
            "profile": null
        })),
        (status = 401, description = "No session; client should go to /login")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Session"
)]
pub async fn session(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let profile = load_profile(&state, auth.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "user_id": auth.user_id,
        "email": auth.email,
        "profile": profile,
    })))
}

/// Rotate a refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Refresh token invalid, expired or revoked")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Session"
)]
pub async fn refresh_token(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> Result<impl Responder, AppError> {
    let token = bearer_token(authorization(&req))?;
    let claims = verify_token(token, &config.jwt_secret)?;

    if claims.token_type != TokenType::Refresh {
        return Err(AuthError::WrongTokenType.into());
    }

    match state.credentials.find_refresh_token(&claims.jti).await? {
        Some(row) if !row.revoked && row.user_id == claims.user_id => {}
        _ => return Err(AuthError::Revoked.into()),
    }

    // revoke old refresh token; losing this race means someone else rotated it first
    if !state.credentials.revoke_refresh_token(&claims.jti).await? {
        return Err(AuthError::Revoked.into());
    }

    let tokens = issue_tokens(&state, &config, claims.user_id, &claims.sub).await?;
    debug!(user_id = claims.user_id, "Refresh token rotated");

    Ok(HttpResponse::Ok().json(tokens))
}

/// Sign out (revokes the refresh token)
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Signed out, also when the token was already invalid")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Session"
)]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> impl Responder {
    let claims = match bearer_token(authorization(&req))
        .and_then(|token| verify_token(token, &config.jwt_secret))
    {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // only refresh tokens can logout
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    match state.credentials.revoke_refresh_token(&claims.jti).await {
        Ok(true) => {
            state.sessions.publish(SessionEvent::SignedOut {
                user_id: claims.user_id,
            });
            info!(user_id = claims.user_id, "Logout successful");
        }
        Ok(false) => debug!(user_id = claims.user_id, "Logout with already revoked token"),
        Err(e) => error!(error = %e, user_id = claims.user_id, "Failed to revoke refresh token"),
    }

    HttpResponse::NoContent().finish()
}
