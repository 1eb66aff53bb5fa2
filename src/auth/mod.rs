use crate::{middleware::protect, state::AppState};
use axum::Router;

mod claims;
pub mod credentials;
mod dto;
pub mod handlers;
pub mod jwt;
pub mod memory;
pub mod password;
pub mod permissions;
pub mod repo;
mod repo_types;

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(handlers::public_routes())
        .merge(protect(handlers::user_routes(), state, None))
}
