use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Request, StatusCode};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::path::Path;
use tower::ServiceExt;

use medidoctor_lib::db::Database;
use medidoctor_lib::routes::booking::{self, BookingRequest};
use medidoctor_lib::routes::doctors::{self, DoctorQuery};
use medidoctor_lib::routes::{admin, assessment, chat, router, scan, system, voice, AppState, SharedState};
use medidoctor_lib::services::assessment::HealthAssessmentRequest;
use medidoctor_lib::services::chat::ChatRequest;
use medidoctor_lib::services::doctors::SEED_DOCTORS;
use medidoctor_lib::services::risk::RiskLevel;
use medidoctor_lib::settings::Settings;

fn test_state(dir: &Path) -> SharedState {
    let db = Database::open_in_memory().unwrap();
    db.run_migrations().unwrap();
    db.seed_doctors(SEED_DOCTORS).unwrap();

    let settings = Settings {
        data_dir: dir.to_path_buf(),
        upload_dir: dir.join("uploads"),
        ..Settings::default()
    };
    AppState::new(db, settings)
}

fn booking_request(doctor_id: i64, phone: &str) -> BookingRequest {
    BookingRequest {
        doctor_id,
        patient_name: "Ana Silva".to_string(),
        patient_phone: phone.to_string(),
        appointment_slot: "Today 2:00 PM".to_string(),
        injury_type: Some("cut".to_string()),
    }
}

fn chat_request(message: &str) -> ChatRequest {
    ChatRequest {
        message: message.to_string(),
        context: None,
    }
}

#[tokio::test]
async fn root_reports_online() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let Json(status) = system::root(State(state)).await;
    assert_eq!(status.status, "online");
    assert_eq!(status.service, "MediDoctor AI Platform");
    assert_eq!(status.version, "1.0.0");
}

#[tokio::test]
async fn scan_stores_file_and_record() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let image = b"fake jpeg bytes for a deep cut".to_vec();
    let result = scan::process_scan(&state, &image, "deep_cut.jpg").await.unwrap();

    assert_eq!(result.injury_type, "cut");
    assert!((0.82..=0.92).contains(&result.confidence));
    assert_eq!(result.scan_id, 1);
    assert!(result.visual_notes.starts_with("Detected CUT."));
    assert!(!result.guidance.first_aid_steps.is_empty());

    let stored: Vec<_> = std::fs::read_dir(dir.path().join("uploads"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].starts_with("scan_") && stored[0].ends_with(".jpg"));

    let Json(stats) = admin::stats(State(state.clone())).await.unwrap();
    assert_eq!(stats.total_scans, 1);
    assert_eq!(stats.injury_distribution.get("cut"), Some(&1));
    assert_eq!(stats.risk_distribution.get(result.risk_level.as_str()), Some(&1));
    assert_eq!(stats.recent_scans[0].confidence, result.confidence);
}

#[tokio::test]
async fn same_image_same_analysis() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let image = vec![7u8; 2048];
    let first = scan::process_scan(&state, &image, "photo.jpg").await.unwrap();
    let second = scan::process_scan(&state, &image, "photo.jpg").await.unwrap();

    assert_eq!(first.injury_type, second.injury_type);
    assert_eq!(first.confidence, second.confidence);
    assert_eq!(first.risk_level, second.risk_level);
    assert_eq!(second.scan_id, 2);
}

#[tokio::test]
async fn high_risk_puts_acute_care_first() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let query = DoctorQuery {
        injury_type: Some("fracture".to_string()),
        risk_level: Some("HIGH".to_string()),
        limit: None,
    };
    let Json(list) = doctors::list_doctors(State(state.clone()), Ok(Query(query))).await.unwrap();
    let names: Vec<_> = list.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Dr. Lisa Patel", "Dr. Sarah Johnson", "Dr. James Williams"]);

    let query = DoctorQuery {
        injury_type: Some("fracture".to_string()),
        risk_level: Some("critical".to_string()),
        limit: Some(2),
    };
    let Json(list) = doctors::list_doctors(State(state), Ok(Query(query))).await.unwrap();
    let names: Vec<_> = list.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Dr. James Williams", "Dr. Lisa Patel"]);
}

#[tokio::test]
async fn all_doctors_without_filters() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let Json(list) = doctors::list_doctors(State(state), Ok(Query(DoctorQuery::default())))
        .await
        .unwrap();
    assert_eq!(list.len(), 8);
    assert!(list.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
}

#[tokio::test]
async fn booking_confirms_with_token() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let Json(booking) = booking::book_appointment(State(state.clone()), Ok(Json(booking_request(2, "5551234567"))))
        .await
        .unwrap();

    assert_eq!(booking.booking_id, 1);
    assert_eq!(booking.doctor_name, "Dr. Michael Chen");
    assert_eq!(booking.specialization, "Orthopedic Surgery");
    assert_eq!(booking.status, "confirmed");
    assert!(booking.token_number.starts_with("MD"));
    assert!(booking.confirmation_message.ends_with(&booking.token_number));

    let Json(stats) = admin::stats(State(state)).await.unwrap();
    assert_eq!(stats.total_appointments, 1);
    assert_eq!(stats.recent_appointments[0].token_number, booking.token_number);
    assert_eq!(stats.recent_appointments[0].hospital, "Medical Center Plus");
}

#[tokio::test]
async fn unknown_doctor_is_not_found_and_not_stored() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let err = booking::book_appointment(State(state.clone()), Ok(Json(booking_request(99, "5551234567"))))
        .await
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
    assert_eq!(err.detail, "Doctor with ID 99 not found. Please refresh and try again.");

    let Json(stats) = admin::stats(State(state)).await.unwrap();
    assert_eq!(stats.total_appointments, 0);
}

#[tokio::test]
async fn short_phone_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let err = booking::book(&state, booking_request(1, "12345")).unwrap_err();
    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn questionnaire_scores_high() {
    let req = HealthAssessmentRequest {
        pain_level: "severe".to_string(),
        swelling: "severe".to_string(),
        duration: "1 week+".to_string(),
        affected_area: "ankle".to_string(),
        ..HealthAssessmentRequest::default()
    };

    let Json(result) = assessment::health_assessment(Ok(Json(req))).await.unwrap();
    assert_eq!(result.risk_level, RiskLevel::High);
    assert_eq!(result.risk_score, 10);
    assert_eq!(result.urgency, "immediate");
    assert_eq!(result.affected_area, "ankle");
    assert!((10_000..=99_999).contains(&result.analysis_id));
}

#[tokio::test]
async fn voice_rejects_unknown_formats() {
    let err = voice::analyze_voice("note.txt", b"hello").unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert!(err.detail.contains(".wav"));
}

#[tokio::test]
async fn voice_feeds_the_questionnaire() {
    let result = voice::analyze_voice("note.WAV", &[0u8; 6]).unwrap();
    assert!(result.transcribed_text.contains("knee"));
    assert_eq!(result.audio_quality, "fair");
    assert_eq!(result.extracted_info.affected_area, "knee");
    assert_eq!(result.analysis.affected_area, "knee");
    assert_eq!(result.analysis.risk_level, RiskLevel::High);
}

#[tokio::test]
async fn chat_persists_conversation() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let Json(first) = chat::send_message(State(state.clone()), Ok(Json(chat_request("Hello"))))
        .await
        .unwrap();
    assert_eq!(first.intent, "greeting");
    assert_eq!(first.conversation_id, 1);

    let second = chat::reply(&state, chat_request("My knee is swollen")).unwrap();
    assert_eq!(second.intent, "swelling_query");
    assert_eq!(second.conversation_id, 2);

    let Json(history) = chat::history(State(state)).await.unwrap();
    assert_eq!(history.total_messages, 2);
    assert_eq!(history.intents_discussed, vec!["greeting", "swelling_query"]);
    assert_eq!(history.entities_mentioned.body_parts, vec!["knee"]);
    assert_eq!(history.conversation_history[1].user_message, "My knee is swollen");
}

#[tokio::test]
async fn empty_chat_message_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let err = chat::reply(&state, chat_request("   ")).unwrap_err();
    assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);

    let Json(history) = chat::history(State(state)).await.unwrap();
    assert_eq!(history.total_messages, 0);
}

// Requests through the full router

const BOUNDARY: &str = "medidoctor-test-boundary";

fn multipart_request(uri: &str, field: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = format!(
        "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
        BOUNDARY, field, filename
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn detail(body: &Value) -> &str {
    body["detail"].as_str().unwrap_or_else(|| panic!("no detail in {}", body))
}

fn poison(state: &SharedState) {
    let held = state.clone();
    let _ = std::thread::spawn(move || {
        let _guard = held.db.lock().unwrap();
        panic!("poison the database lock");
    })
    .join();
}

#[tokio::test]
async fn multipart_scan_upload() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let req = multipart_request("/api/scan", "image", "knee_cut.jpg", b"jpeg bytes");
    let (status, body) = send(router(state.clone()), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scan_id"], 1);
    assert_eq!(body["injury_type"], "cut");
    assert!(body["guidance"]["first_aid_steps"].is_array());

    let Json(stats) = admin::stats(State(state)).await.unwrap();
    assert_eq!(stats.total_scans, 1);
}

#[tokio::test]
async fn scan_without_image_field_is_422() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let req = multipart_request("/api/scan", "file", "cut.jpg", b"jpeg bytes");
    let (status, body) = send(router(state), req).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(detail(&body), "Missing form field 'image'");
}

#[tokio::test]
async fn oversized_upload_is_413() {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open_in_memory().unwrap();
    db.run_migrations().unwrap();
    let settings = Settings {
        data_dir: dir.path().to_path_buf(),
        upload_dir: dir.path().join("uploads"),
        max_upload_bytes: 1024,
        ..Settings::default()
    };
    let state = AppState::new(db, settings);

    let req = multipart_request("/api/scan", "image", "cut.jpg", &vec![1u8; 8 * 1024]);
    let (status, body) = send(router(state), req).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(!detail(&body).is_empty());
    assert!(!dir.path().join("uploads").exists());
}

#[tokio::test]
async fn scan_server_errors_carry_context() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    // a plain file where the upload directory should be
    std::fs::write(dir.path().join("uploads"), b"").unwrap();

    let req = multipart_request("/api/scan", "image", "cut.jpg", b"jpeg bytes");
    let (status, body) = send(router(state), req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(detail(&body).starts_with("Scan failed: "));
}

#[tokio::test]
async fn failed_insert_removes_the_upload() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    poison(&state);

    let err = scan::process_scan(&state, b"jpeg bytes", "cut.jpg").await.unwrap_err();
    assert!(err.status.is_server_error());

    let left = std::fs::read_dir(dir.path().join("uploads")).unwrap().count();
    assert_eq!(left, 0);
}

#[tokio::test]
async fn booking_server_errors_carry_context() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());
    poison(&state);

    let req = json_request(
        "/api/book",
        json!({
            "doctor_id": 1,
            "patient_name": "Ana Silva",
            "patient_phone": "5551234567",
            "appointment_slot": "Today 2:00 PM"
        }),
    );
    let (status, body) = send(router(state), req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(detail(&body).starts_with("Booking failed: "));
}

#[tokio::test]
async fn voice_upload_with_text_file_is_400() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let req = multipart_request("/api/voice-analysis", "audio", "note.txt", b"hello");
    let (status, body) = send(router(state), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(detail(&body).starts_with("Unsupported audio format"));
}

#[tokio::test]
async fn voice_upload_through_router() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let req = multipart_request("/api/voice-analysis", "audio", "note.wav", &[0u8; 6]);
    let (status, body) = send(router(state), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extracted_info"]["affected_area"], "knee");
    assert_eq!(body["analysis"]["risk_level"], "HIGH");
}

#[tokio::test]
async fn malformed_json_bodies_render_detail() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let req = json_request(
        "/api/book",
        json!({ "doctor_id": 1, "patient_name": "Ana Silva", "appointment_slot": "Today 2:00 PM" }),
    );
    let (status, body) = send(router(state.clone()), req).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(detail(&body).contains("patient_phone"));

    let (status, body) = send(router(state.clone()), json_request("/api/chat", json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(detail(&body).contains("message"));

    let req = Request::builder()
        .method("POST")
        .uri("/api/health-assessment")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send(router(state), req).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(!detail(&body).is_empty());
}

#[tokio::test]
async fn bad_multipart_and_query_render_detail() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let (status, body) = send(router(state.clone()), json_request("/api/scan", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!detail(&body).is_empty());

    let req = Request::builder()
        .uri("/api/doctors?limit=many")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(state), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(detail(&body).starts_with("Failed to deserialize query string"));
}

#[tokio::test]
async fn doctors_query_through_router() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let req = Request::builder()
        .uri("/api/doctors?injury_type=fracture&risk_level=HIGH&limit=1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(router(state), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["name"], "Dr. Lisa Patel");
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri("/api/scan")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn cors_preflight_follows_allowed_origins() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state(dir.path());

    let resp = router(state.clone())
        .oneshot(preflight("https://x.vercel.app"))
        .await
        .unwrap();
    let headers = resp.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://x.vercel.app"
    );
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(), "true");

    let resp = router(state)
        .oneshot(preflight("https://vercel.app.evil.test"))
        .await
        .unwrap();
    assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}
