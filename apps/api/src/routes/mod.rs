pub mod health;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::matching::MatchBatch;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/candidates/:id/matches",
            get(handle_match_candidate),
        )
        .with_state(state)
}

/// GET /api/v1/candidates/:id/matches
///
/// Runs the full matching pass for one candidate and returns the ranked
/// batch. The response is always a list (possibly empty); the only error
/// cases are an unknown candidate (404) and a candidate with no usable
/// evidence (422).
async fn handle_match_candidate(
    State(state): State<AppState>,
    Path(candidate_id): Path<Uuid>,
) -> Result<Json<MatchBatch>, AppError> {
    let batch = state.engine.match_candidate(candidate_id).await?;
    Ok(Json(batch))
}
