use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest, RequestEmailBody, TokenResponse},
        extractors::AdminUser,
        password::{hash_password, verify_password},
        services::is_valid_email,
        tokens::{JwtKeys, TokenKind},
    },
    error::ApiError,
    mail::send_in_background,
    state::AppState,
    users::{dto::PublicUser, repo_types::User, services::gravatar_url},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/request_email", post(request_email))
        .route("/auth/confirmed_email/:token", get(confirmed_email))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/admin", get(admin))
}

fn validate_registration(payload: &RegisterRequest) -> Result<(), ApiError> {
    if !is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email".into()));
    }
    if payload.username.len() < 2 || payload.username.len() > 50 {
        return Err(ApiError::Validation(
            "Username must be between 2 and 50 characters".into(),
        ));
    }
    if payload.password.len() < 8 {
        return Err(ApiError::Validation("Password too short".into()));
    }
    Ok(())
}

/// Queue the confirmation link without blocking the request.
fn send_confirmation_email(state: &AppState, email: &str) {
    let keys = JwtKeys::from_ref(state);
    match keys.issue_confirmation(email) {
        Ok(token) => {
            let link = format!(
                "{}/api/auth/confirmed_email/{}",
                state.config.frontend_url, token
            );
            send_in_background(
                state.mailer.clone(),
                email.to_string(),
                "Confirm your email".to_string(),
                format!("Follow the link to confirm your email address: {link}"),
            );
        }
        Err(e) => warn!(error = %e, "could not issue confirmation token"),
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    payload.email = payload.email.trim().to_lowercase();
    payload.username = payload.username.trim().to_string();
    validate_registration(&payload)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict("User already exists"));
    }
    if User::find_by_username(&state.db, &payload.username)
        .await?
        .is_some()
    {
        warn!(username = %payload.username, "username already registered");
        return Err(ApiError::Conflict("User already exists"));
    }

    let hash = hash_password(&payload.password)?;
    let avatar = gravatar_url(&payload.email);
    let user = User::create(
        &state.db,
        &payload.username,
        &payload.email,
        &hash,
        Some(&avatar),
    )
    .await?;

    send_confirmation_email(&state, &user.email);

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let Some(user) = User::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(ApiError::Unauthorized("Invalid email or password"));
    };

    if !user.confirmed {
        warn!(email = %payload.email, "login attempt with unconfirmed email");
        return Err(ApiError::Unauthorized("Email address not confirmed"));
    }

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid email or password"));
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.issue_session(&user.username, None)?;

    info!(user_id = %user.id, username = %user.username, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn request_email(
    State(state): State<AppState>,
    Json(payload): Json<RequestEmailBody>,
) -> Result<Json<Value>, ApiError> {
    let email = payload.email.trim().to_lowercase();

    match User::find_by_email(&state.db, &email).await? {
        Some(user) if user.confirmed => {
            return Ok(Json(json!({ "message": "Your email is already confirmed" })));
        }
        Some(user) => send_confirmation_email(&state, &user.email),
        // unknown address gets the same answer as a pending one
        None => {}
    }
    Ok(Json(
        json!({ "message": "Check your email for confirmation" }),
    ))
}

#[instrument(skip(state))]
pub async fn confirmed_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify(&token, TokenKind::EmailConfirm).map_err(|_| {
        ApiError::Validation("Invalid token for email verification".into())
    })?;
    let email = claims.sub;

    let user = User::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Validation("Verification error".into()))?;

    if user.confirmed {
        return Ok(Json(json!({ "message": "Your email is already confirmed" })));
    }

    User::confirm_email(&state.db, &email).await?;
    info!(user_id = %user.id, "email confirmed");
    Ok(Json(json!({ "message": "Email successfully confirmed" })))
}

/// Sample role-gated route.
#[instrument(skip_all)]
pub async fn admin(AdminUser(user): AdminUser) -> Json<Value> {
    Json(json!({
        "message": format!("Welcome, {}! This is the admin route", user.username)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn registration_validation_accepts_good_payload() {
        assert!(validate_registration(&request("jane", "jane@example.com", "long-enough")).is_ok());
    }

    #[test]
    fn registration_validation_rejects_bad_fields() {
        let err = validate_registration(&request("jane", "nope", "long-enough")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = validate_registration(&request("j", "jane@example.com", "long-enough"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = validate_registration(&request("jane", "jane@example.com", "short")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
