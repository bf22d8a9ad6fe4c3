use crate::{
    auth::auth::AuthUser,
    error::{AppError, StoreError, ValidationError},
    model::profile::{ProfileUpdate, UserProfile},
    state::AppState,
};
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use tracing::{debug, error, info};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct ProfileUpdated {
    #[schema(example = "Profil telah diperbarui")]
    pub message: String,
    pub profile: UserProfile,
}

/// Cached profile lookup shared by the session and attendance handlers.
pub async fn load_profile(
    state: &AppState,
    user_id: u64,
) -> Result<Option<UserProfile>, StoreError> {
    if let Some(profile) = state.profile_cache.get(user_id).await {
        return Ok(Some(profile));
    }

    debug!(user_id, "Profile cache miss");
    let profile = state.profiles.find(user_id).await?;
    if let Some(p) = &profile {
        state.profile_cache.put(p.clone()).await;
    }
    Ok(profile)
}

/// Trims the editable fields and rejects values the profile page would not accept.
pub fn validate_update(mut update: ProfileUpdate) -> Result<ProfileUpdate, ValidationError> {
    if update.is_empty() {
        return Err(ValidationError::EmptyUpdate);
    }

    if let Some(name) = update.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::InvalidField {
                field: "name",
                reason: "must not be empty",
            });
        }
    }

    if let Some(email) = update.email.as_mut() {
        *email = email.trim().to_string();
        let valid = match email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty() && !domain.is_empty() && !domain.contains('@')
            }
            None => false,
        };
        if !valid {
            return Err(ValidationError::InvalidField {
                field: "email",
                reason: "must look like name@domain",
            });
        }
    }

    if let Some(phone) = update.phone.as_mut() {
        *phone = phone.trim().to_string();
        let digits = phone.strip_prefix('+').unwrap_or(phone.as_str());
        if !(6..=20).contains(&phone.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidField {
                field: "phone",
                reason: "must be 6-20 digits with an optional leading +",
            });
        }
    }

    Ok(update)
}

/// Get own profile
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile of the signed-in user", body = UserProfile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found", body = Object, example = json!({
            "error": "Profile not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Profile"
)]
pub async fn get_profile(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let profile = load_profile(&state, auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to fetch profile");
            e
        })?
        .ok_or(StoreError::NotFound { entity: "Profile" })?;

    Ok(HttpResponse::Ok().json(profile))
}

/// Update own profile (name, email, phone only)
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdated),
        (status = 400, description = "Invalid or empty update", body = Object, example = json!({
            "error": "Invalid email: must look like name@domain"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Profile not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Profile"
)]
pub async fn update_profile(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<ProfileUpdate>,
) -> Result<impl Responder, AppError> {
    let user_id = auth.user_id;
    let update = validate_update(payload.into_inner())?;

    let found = state.profiles.update(user_id, &update).await.map_err(|e| {
        error!(error = %e, user_id, "Failed to update profile");
        e
    })?;
    state.profile_cache.invalidate(user_id).await;

    if !found {
        return Err(StoreError::NotFound { entity: "Profile" }.into());
    }

    let profile = load_profile(&state, user_id)
        .await?
        .ok_or(StoreError::NotFound { entity: "Profile" })?;

    info!(user_id, "Profile updated");

    Ok(HttpResponse::Ok().json(ProfileUpdated {
        message: "Profil telah diperbarui".to_string(),
        profile,
    }))
}
