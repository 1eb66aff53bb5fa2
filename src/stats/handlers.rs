use axum::{
    extract::{rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::aggregate::Aggregate;
use crate::{
    error::AppResult,
    middleware::AuthUser,
    records::{dto::RangeQuery, DateRange},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/stats", get(get_stats))
}

/// Totals for the caller. Unbounded reads go through the cache; a date
/// window is always computed from the store.
#[instrument(skip(state, query))]
pub async fn get_stats(
    State(state): State<AppState>,
    AuthUser(username): AuthUser,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> AppResult<Json<Aggregate>> {
    let Query(query) = query?;
    let aggregate = match DateRange::from_bounds(query.start.as_deref(), query.end.as_deref())? {
        Some(range) => {
            let records = state
                .records
                .query_by_identity_and_range(&username, range)
                .await?;
            Aggregate::from_records(&records)
        }
        None => state.stats.get(&username, state.records.as_ref()).await?,
    };
    Ok(Json(aggregate))
}
