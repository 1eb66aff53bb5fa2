pub mod dto;
pub mod handlers;
pub mod memory;
pub mod model;
pub mod repo;
mod repo_types;
pub mod services;

use axum::Router;

use crate::{auth::permissions::Permission, middleware::protect, state::AppState};

pub use memory::InMemoryRecordStore;
pub use model::{DateRange, FitnessRecord, NewRecord, RecordKind, RecordPatch};
pub use repo::{PgRecordStore, RecordStore};

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

pub fn router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(protect(handlers::read_routes(), state, Some(Permission::View)))
        .merge(protect(handlers::write_routes(), state, Some(Permission::Edit)))
}
