use axum::extract::State;
use axum::Json;
use crate::db::AdminStats;
use crate::error::{ApiError, ApiResult};
use crate::routes::SharedState;

/// Dashboard statistics
pub async fn stats(State(state): State<SharedState>) -> ApiResult<Json<AdminStats>> {
    let stats = state
        .db()?
        .admin_stats()
        .map_err(|e| ApiError::from(e).context("Failed to fetch stats"))?;
    Ok(Json(stats))
}
