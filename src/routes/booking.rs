use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::db::{Database, NewAppointment};
use crate::error::{ApiError, ApiResult};
use crate::routes::{AppState, SharedState};

const TOKEN_ATTEMPTS: usize = 50;
const CONFIRMED: &str = "confirmed";
const BOOKING_DISCLAIMER: &str = "This is a demo booking. No real appointment has been created.";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingRequest {
    pub doctor_id: i64,
    pub patient_name: String,
    pub patient_phone: String,
    pub appointment_slot: String,
    #[serde(default)]
    pub injury_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BookingResponse {
    pub booking_id: i64,
    pub token_number: String,
    pub doctor_name: String,
    pub specialization: String,
    pub appointment_slot: String,
    pub status: String,
    pub confirmation_message: String,
    pub disclaimer: String,
}

impl BookingRequest {
    pub fn validate(&self) -> ApiResult<()> {
        let name_len = self.patient_name.chars().count();
        if !(2..=100).contains(&name_len) {
            return Err(ApiError::unprocessable(
                "patient_name must be between 2 and 100 characters",
            ));
        }
        let phone_len = self.patient_phone.chars().count();
        if !(10..=15).contains(&phone_len) {
            return Err(ApiError::unprocessable(
                "patient_phone must be between 10 and 15 characters",
            ));
        }
        Ok(())
    }
}

/// `MD` followed by four digits, unused by any stored appointment
fn new_token(db: &Database) -> ApiResult<String> {
    let mut rng = rand::thread_rng();
    for _ in 0..TOKEN_ATTEMPTS {
        let token = format!("MD{}", rng.gen_range(1000..=9999));
        if !db.token_exists(&token)? {
            return Ok(token);
        }
    }
    Err(ApiError::internal("No free token number available"))
}

/// Book a demo appointment
pub async fn book_appointment(
    State(state): State<SharedState>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> ApiResult<Json<BookingResponse>> {
    let Json(req) = payload?;
    book(&state, req)
        .map(Json)
        .map_err(|e| e.context("Booking failed"))
}

pub fn book(state: &AppState, req: BookingRequest) -> ApiResult<BookingResponse> {
    req.validate()?;

    let db = state.db()?;
    let doctor = db.get_doctor(req.doctor_id)?.ok_or_else(|| {
        ApiError::not_found(format!(
            "Doctor with ID {} not found. Please refresh and try again.",
            req.doctor_id
        ))
    })?;

    let token_number = new_token(&db)?;
    let booking_id = db.insert_appointment(&NewAppointment {
        doctor_id: doctor.id,
        patient_name: req.patient_name,
        patient_phone: req.patient_phone,
        appointment_slot: req.appointment_slot.clone(),
        injury_type: req.injury_type,
        token_number: token_number.clone(),
        status: CONFIRMED.to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
    })?;
    drop(db);

    log::info!("Appointment {} booked with {} ({})", booking_id, doctor.name, token_number);

    Ok(BookingResponse {
        booking_id,
        confirmation_message: format!("Appointment confirmed! Your token number is {}", token_number),
        token_number,
        doctor_name: doctor.name,
        specialization: doctor.specialization,
        appointment_slot: req.appointment_slot,
        status: CONFIRMED.to_string(),
        disclaimer: BOOKING_DISCLAIMER.to_string(),
    })
}
