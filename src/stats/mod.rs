pub mod aggregate;
pub mod cache;
pub mod handlers;

use axum::Router;

use crate::{auth::permissions::Permission, middleware::protect, state::AppState};

pub use aggregate::Aggregate;
pub use cache::StatsCache;

pub fn router(state: &AppState) -> Router<AppState> {
    protect(handlers::routes(), state, Some(Permission::View))
}
