use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::ApiError,
    state::AppState,
    users::{
        dto::{PublicUser, UpdateAvatarRequest},
        repo_types::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(get_me))
        .route("/users/avatar", put(update_avatar))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<PublicUser> {
    Json(user.into())
}

/// Replace the caller's avatar URL. A cached lookup of this user may keep
/// serving the old avatar until the cache entry's TTL runs out.
#[instrument(skip(state, payload))]
pub async fn update_avatar(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<UpdateAvatarRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let url = payload.avatar.trim();
    if url.is_empty() || url.len() > 255 {
        return Err(ApiError::Validation(
            "avatar must be a non-empty URL of at most 255 characters".into(),
        ));
    }

    let updated = User::update_avatar(&state.db, &user.email, url)
        .await?
        .ok_or(ApiError::NotFound("User not found"))?;

    info!(user_id = %updated.id, "avatar updated");
    Ok(Json(updated.into()))
}
