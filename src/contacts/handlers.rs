use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    contacts::{
        birthdays::birthday_in_window,
        dto::{BirthdayRequest, ContactPayload, Pagination, SearchParams},
        repo_types::Contact,
    },
    error::ApiError,
    state::AppState,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/contacts", get(read_contacts).post(create_contact))
        .route("/contacts/search/", get(search_contacts))
        .route("/contacts/upcoming-birthdays", post(upcoming_birthdays))
        .route(
            "/contacts/:id",
            get(read_contact).put(update_contact).delete(remove_contact),
        )
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn read_contacts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = Contact::list(&state.db, user.id, p.skip, p.limit).await?;
    Ok(Json(contacts))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn read_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Contact>, ApiError> {
    let contact = Contact::find(&state.db, user.id, id)
        .await?
        .ok_or(ApiError::NotFound("Contact not found"))?;
    Ok(Json(contact))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn create_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ContactPayload>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    payload.validate(OffsetDateTime::now_utc().date())?;
    let contact = Contact::create(&state.db, user.id, &payload).await?;
    info!(contact_id = %contact.id, "contact created");
    Ok((StatusCode::CREATED, Json(contact)))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn update_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ContactPayload>,
) -> Result<Json<Contact>, ApiError> {
    payload.validate(OffsetDateTime::now_utc().date())?;
    let contact = Contact::update(&state.db, user.id, id, &payload)
        .await?
        .ok_or(ApiError::NotFound("Contact not found"))?;
    Ok(Json(contact))
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !Contact::delete(&state.db, user.id, id).await? {
        return Err(ApiError::NotFound("Contact not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn search_contacts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(p): Query<SearchParams>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    let contacts = Contact::search(&state.db, user.id, &p.text, p.skip, p.limit).await?;
    Ok(Json(contacts))
}

#[instrument(skip(state, user, payload), fields(user_id = %user.id))]
pub async fn upcoming_birthdays(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<BirthdayRequest>,
) -> Result<Json<Vec<Contact>>, ApiError> {
    if !(0..=366).contains(&payload.days) {
        return Err(ApiError::Validation(
            "days must be between 0 and 366".into(),
        ));
    }
    let today = OffsetDateTime::now_utc().date();
    let contacts = Contact::list_all(&state.db, user.id)
        .await?
        .into_iter()
        .filter(|c| birthday_in_window(c.birthday, today, payload.days))
        .collect();
    Ok(Json(contacts))
}
