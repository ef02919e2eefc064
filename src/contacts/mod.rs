use crate::state::AppState;
use axum::Router;

pub mod birthdays;
pub mod dto;
pub mod handlers;
mod repo;
pub mod repo_types;

pub fn router() -> Router<AppState> {
    handlers::contact_routes()
}
