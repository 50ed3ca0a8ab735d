// HTTP routes over the services and the database

pub mod admin;
pub mod assessment;
pub mod booking;
pub mod chat;
pub mod doctors;
pub mod scan;
pub mod system;
pub mod voice;

use axum::extract::{DefaultBodyLimit, Multipart};
use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::db::Database;
use crate::error::{ApiError, ApiResult};
use crate::settings::Settings;

pub struct AppState {
    pub db: Mutex<Database>,
    pub settings: Settings,
    pub started_at: Instant,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(db: Database, settings: Settings) -> SharedState {
        Arc::new(Self {
            db: Mutex::new(db),
            settings,
            started_at: Instant::now(),
        })
    }

    /// Lock the database. Never hold the guard across an `.await`.
    pub fn db(&self) -> ApiResult<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|e| ApiError::internal(e.to_string()))
    }
}

pub fn router(state: SharedState) -> Router {
    let body_limit = state.settings.max_upload_bytes;
    let cors = cors_layer(&state.settings);

    Router::new()
        .route("/", get(system::root))
        .route("/api/scan", post(scan::scan_injury))
        .route("/api/doctors", get(doctors::list_doctors))
        .route("/api/book", post(booking::book_appointment))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/health-assessment", post(assessment::health_assessment))
        .route("/api/voice-analysis", post(voice::voice_analysis))
        .route("/api/chat", post(chat::send_message))
        .route("/api/chat/history", get(chat::history))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let settings = settings.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin.to_str().map_or(false, |o| settings.origin_allowed(o))
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// A single uploaded file from a multipart form
#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Pull the named file field out of a multipart body; 422 when it is missing
pub async fn read_upload(mut multipart: Multipart, field_name: &str) -> ApiResult<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some(field_name) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;
        return Ok(Upload {
            filename,
            bytes: bytes.to_vec(),
        });
    }

    Err(ApiError::unprocessable(format!("Missing form field '{}'", field_name)))
}
