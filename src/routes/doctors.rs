use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use crate::error::ApiResult;
use crate::routes::SharedState;
use crate::services::doctors::{self, Doctor, DEFAULT_LIMIT};
use crate::services::risk::RiskLevel;

#[derive(Debug, Deserialize, Default)]
pub struct DoctorQuery {
    pub injury_type: Option<String>,
    pub risk_level: Option<String>,
    pub limit: Option<usize>,
}

/// Recommended doctors for an injury type and risk level
pub async fn list_doctors(
    State(state): State<SharedState>,
    params: Result<Query<DoctorQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Doctor>>> {
    let Query(query) = params?;
    let all = state.db()?.list_doctors()?;

    // Anything that isn't a known level ranks like a non-urgent request
    let risk_level = query
        .risk_level
        .as_deref()
        .and_then(|level| level.parse::<RiskLevel>().ok());

    Ok(Json(doctors::recommend(
        all,
        query.injury_type.as_deref(),
        risk_level,
        query.limit.unwrap_or(DEFAULT_LIMIT),
    )))
}
