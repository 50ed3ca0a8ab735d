use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use crate::services::risk::RiskLevel;

/// Doctor profile as returned by the API
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    pub hospital: String,
    pub distance_km: f64,
    pub rating: f64,
    pub available_slots: Vec<String>,
    pub expertise: Vec<String>,
}

/// Static doctor profile used to seed an empty database
#[derive(Debug, Clone, Copy)]
pub struct DoctorSeed {
    pub name: &'static str,
    pub specialization: &'static str,
    pub hospital: &'static str,
    pub distance_km: f64,
    pub rating: f64,
    pub available_slots: &'static [&'static str],
    pub expertise: &'static [&'static str],
}

pub const SEED_DOCTORS: &[DoctorSeed] = &[
    DoctorSeed {
        name: "Dr. Sarah Johnson",
        specialization: "Emergency Medicine",
        hospital: "City General Hospital",
        distance_km: 2.5,
        rating: 4.8,
        available_slots: &[
            "Today 2:00 PM",
            "Today 4:00 PM",
            "Tomorrow 10:00 AM",
            "Tomorrow 2:00 PM",
            "Tomorrow 5:00 PM",
        ],
        expertise: &["trauma", "burns", "fractures", "emergency_care"],
    },
    DoctorSeed {
        name: "Dr. Michael Chen",
        specialization: "Orthopedic Surgery",
        hospital: "Medical Center Plus",
        distance_km: 3.2,
        rating: 4.9,
        available_slots: &[
            "Tomorrow 9:00 AM",
            "Tomorrow 11:00 AM",
            "Feb 11 10:00 AM",
            "Feb 11 3:00 PM",
        ],
        expertise: &["fractures", "bone_injuries", "sports_injuries"],
    },
    DoctorSeed {
        name: "Dr. Emily Rodriguez",
        specialization: "Dermatology",
        hospital: "Skin Care Clinic",
        distance_km: 1.8,
        rating: 4.7,
        available_slots: &[
            "Today 3:00 PM",
            "Tomorrow 10:00 AM",
            "Tomorrow 1:00 PM",
            "Feb 10 2:00 PM",
        ],
        expertise: &["rash", "burns", "skin_conditions", "allergies"],
    },
    DoctorSeed {
        name: "Dr. James Williams",
        specialization: "General Practice",
        hospital: "Community Health Center",
        distance_km: 1.2,
        rating: 4.6,
        available_slots: &[
            "Today 1:00 PM",
            "Today 3:30 PM",
            "Today 5:00 PM",
            "Tomorrow 9:00 AM",
            "Tomorrow 11:00 AM",
            "Tomorrow 2:00 PM",
        ],
        expertise: &["general_care", "cuts", "bruises", "minor_injuries"],
    },
    DoctorSeed {
        name: "Dr. Lisa Patel",
        specialization: "Urgent Care Physician",
        hospital: "QuickCare Medical",
        distance_km: 2.0,
        rating: 4.5,
        available_slots: &[
            "Today 12:00 PM",
            "Today 2:00 PM",
            "Today 4:00 PM",
            "Today 6:00 PM",
            "Tomorrow 10:00 AM",
        ],
        expertise: &["urgent_care", "minor_trauma", "burns", "cuts"],
    },
    DoctorSeed {
        name: "Dr. Robert Kumar",
        specialization: "Sports Medicine",
        hospital: "Athletes Medical Institute",
        distance_km: 4.5,
        rating: 4.8,
        available_slots: &[
            "Tomorrow 8:00 AM",
            "Tomorrow 10:00 AM",
            "Feb 11 9:00 AM",
            "Feb 11 2:00 PM",
        ],
        expertise: &["sports_injuries", "fractures", "swelling", "sprains"],
    },
    DoctorSeed {
        name: "Dr. Amanda Foster",
        specialization: "Plastic Surgery",
        hospital: "Cosmetic & Reconstructive Center",
        distance_km: 5.2,
        rating: 4.9,
        available_slots: &[
            "Feb 10 11:00 AM",
            "Feb 10 3:00 PM",
            "Feb 11 10:00 AM",
            "Feb 12 2:00 PM",
        ],
        expertise: &["burns", "skin_reconstruction", "wound_care"],
    },
    DoctorSeed {
        name: "Dr. David Martinez",
        specialization: "Pediatrics",
        hospital: "Children's Health Center",
        distance_km: 2.8,
        rating: 4.7,
        available_slots: &[
            "Today 2:30 PM",
            "Tomorrow 9:30 AM",
            "Tomorrow 1:30 PM",
            "Tomorrow 4:00 PM",
        ],
        expertise: &["pediatric_care", "children_injuries", "rash", "burns"],
    },
];

pub const DEFAULT_LIMIT: usize = 10;

/// Expertise tags that accept any injury type
const CATCH_ALL_EXPERTISE: &[&str] = &["general_care", "urgent_care", "emergency_care"];

fn is_acute_care(doctor: &Doctor) -> bool {
    let spec = doctor.specialization.to_lowercase();
    spec.contains("emergency") || spec.contains("urgent")
}

fn treats(doctor: &Doctor, injury_type: &str) -> bool {
    doctor
        .expertise
        .iter()
        .any(|tag| tag == injury_type || CATCH_ALL_EXPERTISE.contains(&tag.as_str()))
}

/// Filter and rank doctors for an injury and risk level
pub fn recommend(
    doctors: Vec<Doctor>,
    injury_type: Option<&str>,
    risk_level: Option<RiskLevel>,
    limit: usize,
) -> Vec<Doctor> {
    let mut matched: Vec<Doctor> = match injury_type.filter(|t| !t.is_empty()) {
        Some(injury) => doctors.into_iter().filter(|d| treats(d, injury)).collect(),
        None => doctors,
    };

    let by_distance = |a: &Doctor, b: &Doctor| {
        a.distance_km.partial_cmp(&b.distance_km).unwrap_or(Ordering::Equal)
    };

    if risk_level == Some(RiskLevel::High) {
        matched.sort_by(|a, b| {
            is_acute_care(b)
                .cmp(&is_acute_care(a))
                .then_with(|| by_distance(a, b))
        });
    } else {
        matched.sort_by(|a, b| {
            by_distance(a, b)
                .then_with(|| b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal))
        });
    }

    matched.truncate(limit);
    matched
}
