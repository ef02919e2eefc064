use crate::state::AppState;
use axum::Router;

pub mod cache;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod password;
pub(crate) mod services;
pub mod tokens;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::admin_routes())
}
