use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use crate::{
    auth::tokens::{JwtKeys, TokenKind},
    error::ApiError,
    state::AppState,
    users::repo_types::{User, UserRole},
};

/// Resolves the bearer token to a full user record: verify the session token,
/// look the username up in the cache, fall back to the database on a miss and
/// fill the cache on the way out. Every failure collapses into the same 401.
#[derive(Debug)]
pub struct AuthUser(pub User);

/// `AuthUser` plus the ADMIN role gate.
#[derive(Debug)]
pub struct AdminUser(pub User);

const CREDENTIALS_ERROR: ApiError = ApiError::Unauthorized("Could not validate credentials");

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(CREDENTIALS_ERROR)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or(CREDENTIALS_ERROR)?;

        let keys = JwtKeys::from_ref(state);
        let claims = match keys.verify(token, TokenKind::Session) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired session token");
                return Err(CREDENTIALS_ERROR);
            }
        };
        let username = claims.sub;

        if let Some(user) = state.cache.get(&username) {
            return Ok(AuthUser(user));
        }

        let user = User::find_by_username(&state.db, &username)
            .await
            .map_err(ApiError::Internal)?
            .ok_or(CREDENTIALS_ERROR)?;

        state.cache.insert(user.clone());
        Ok(AuthUser(user))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Admin {
            return Err(ApiError::Forbidden(
                "The user does not have enough privileges",
            ));
        }
        Ok(AdminUser(user))
    }
}
