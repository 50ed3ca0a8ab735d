use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use crate::db::NewScan;
use crate::error::{ApiError, ApiResult};
use crate::routes::{read_upload, AppState, SharedState};
use crate::services::guidance::{self, Guidance};
use crate::services::injury;
use crate::services::risk::{self, RiskLevel};

const SCAN_DISCLAIMER: &str =
    "This is a prototype for demonstration purposes only. Not intended for medical diagnosis or treatment.";

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResponse {
    pub scan_id: i64,
    pub injury_type: String,
    pub confidence: f64,
    pub visual_notes: String,
    pub visual_indicators: Vec<String>,
    pub risk_level: RiskLevel,
    pub risk_reason: String,
    pub risk_color: String,
    pub risk_factors: Vec<String>,
    pub guidance: Guidance,
    pub timestamp: String,
    pub disclaimer: String,
}

/// Upload an injury photo and get the mock analysis
pub async fn scan_injury(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ScanResponse>> {
    let upload = read_upload(multipart?, "image").await?;
    process_scan(&state, &upload.bytes, &upload.filename)
        .await
        .map(Json)
        .map_err(|e| e.context("Scan failed"))
}

/// Store the image, run injury, risk and guidance engines, persist the result
pub async fn process_scan(state: &AppState, image: &[u8], filename: &str) -> ApiResult<ScanResponse> {
    let now = chrono::Utc::now();
    let upload_dir = &state.settings.upload_dir;
    let path = upload_dir.join(format!(
        "scan_{}_{}.jpg",
        now.format("%Y%m%d_%H%M%S"),
        uuid::Uuid::new_v4().simple()
    ));

    tokio::fs::create_dir_all(upload_dir).await?;
    tokio::fs::write(&path, image).await?;

    let analysis = injury::analyze_injury(image, filename);
    let risk = risk::classify_risk(&analysis.injury_type, analysis.confidence, &analysis.visual_notes);
    let guidance = guidance::generate_guidance(&analysis.injury_type, risk.level);
    let timestamp = now.to_rfc3339();

    let record = NewScan {
        injury_type: analysis.injury_type.clone(),
        confidence_score: analysis.confidence,
        risk_level: risk.level.to_string(),
        image_path: Some(path.to_string_lossy().into_owned()),
        visual_notes: Some(analysis.visual_notes.clone()),
        created_at: timestamp.clone(),
    };
    let inserted = state
        .db()
        .and_then(|db| db.insert_scan(&record).map_err(ApiError::from));

    // No row points at the image if the insert failed
    let scan_id = match inserted {
        Ok(id) => id,
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&path).await {
                log::warn!("Failed to remove orphaned upload {:?}: {}", path, rm);
            }
            return Err(e);
        }
    };

    log::info!(
        "Scan {} stored: {} ({}) risk {}, {}",
        scan_id,
        analysis.injury_type,
        analysis.confidence,
        risk.level,
        risk::urgency_for(risk.level)
    );

    Ok(ScanResponse {
        scan_id,
        injury_type: analysis.injury_type,
        confidence: analysis.confidence,
        visual_notes: analysis.visual_notes,
        visual_indicators: analysis.visual_indicators,
        risk_level: risk.level,
        risk_reason: risk.reason,
        risk_color: risk.color,
        risk_factors: risk.factors,
        guidance,
        timestamp,
        disclaimer: SCAN_DISCLAIMER.to_string(),
    })
}
