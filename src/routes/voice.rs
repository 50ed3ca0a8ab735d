use axum::extract::multipart::MultipartRejection;
use axum::extract::Multipart;
use axum::Json;
use serde::{Deserialize, Serialize};
use crate::error::{ApiError, ApiResult};
use crate::routes::read_upload;
use crate::services::assessment::{self, HealthAssessment};
use crate::services::voice::{self, ExtractedHealthInfo, SUPPORTED_AUDIO_FORMATS};

#[derive(Debug, Serialize, Deserialize)]
pub struct VoiceAnalysisResponse {
    pub transcribed_text: String,
    pub confidence: f64,
    pub detected_language: String,
    pub duration_seconds: f64,
    pub audio_quality: String,
    pub extracted_info: ExtractedHealthInfo,
    pub analysis: HealthAssessment,
    pub timestamp: String,
}

/// Transcribe a voice note and run the questionnaire scorer on it
pub async fn voice_analysis(
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<VoiceAnalysisResponse>> {
    let upload = read_upload(multipart?, "audio").await?;
    analyze_voice(&upload.filename, &upload.bytes).map(Json)
}

pub fn analyze_voice(filename: &str, audio: &[u8]) -> ApiResult<VoiceAnalysisResponse> {
    if !voice::is_supported_audio(filename) {
        return Err(ApiError::bad_request(format!(
            "Unsupported audio format. Supported formats: {}",
            SUPPORTED_AUDIO_FORMATS.join(", ")
        )));
    }

    let transcription = voice::transcribe(audio);
    let info = voice::extract_health_info(&transcription.transcribed_text);
    let analysis = assessment::analyze_questionnaire(&voice::to_questionnaire(&info));

    log::info!(
        "Voice note {:?} ({} bytes): {} in {}",
        filename,
        audio.len(),
        analysis.risk_level,
        info.affected_area
    );

    Ok(VoiceAnalysisResponse {
        transcribed_text: transcription.transcribed_text,
        confidence: transcription.confidence,
        detected_language: transcription.detected_language,
        duration_seconds: transcription.duration_seconds,
        audio_quality: transcription.audio_quality,
        extracted_info: info,
        analysis,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}
