use axum::extract::rejection::JsonRejection;
use axum::Json;
use crate::error::ApiResult;
use crate::services::assessment::{self, HealthAssessment, HealthAssessmentRequest};

/// Score a health questionnaire
pub async fn health_assessment(
    payload: Result<Json<HealthAssessmentRequest>, JsonRejection>,
) -> ApiResult<Json<HealthAssessment>> {
    let Json(req) = payload?;
    let result = assessment::analyze_questionnaire(&req);
    log::info!(
        "Assessment {}: {} (score {})",
        result.analysis_id,
        result.risk_level,
        result.risk_score
    );
    Ok(Json(result))
}
