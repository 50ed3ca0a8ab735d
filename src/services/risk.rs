use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Risk Classification Engine
/// Rule-based triage of a scan into LOW / MEDIUM / HIGH

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            other => Err(format!("Unknown risk level: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub reason: String,
    pub color: String,
    pub factors: Vec<String>,
}

const CRITICAL_KEYWORDS: &[&str] = &["active bleeding", "open laceration", "bone", "fracture"];

fn assessment(level: RiskLevel, color: &str, factors: Vec<String>) -> RiskAssessment {
    let reason = factors.iter().map(|f| format!("\n• {}", f)).collect::<String>();
    RiskAssessment {
        level,
        reason,
        color: color.to_string(),
        factors,
    }
}

fn factors(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// Classify a scan. Rules are evaluated in order; the first match wins.
pub fn classify_risk(injury_type: &str, confidence: f64, visual_notes: &str) -> RiskAssessment {
    let notes = visual_notes.to_lowercase();
    let has_bleeding = notes.contains("bleed") || notes.contains("blood");
    let has_open_wound = notes.contains("open wound") || notes.contains("laceration");
    let has_bruising =
        notes.contains("bruis") || notes.contains("purple") || notes.contains("discoloration");

    match injury_type {
        "cut" if has_bleeding && has_open_wound => assessment(
            RiskLevel::High,
            "red",
            vec![
                "Open laceration present".into(),
                "Active bleeding detected".into(),
                if has_bruising {
                    "Bruising suggests possible deeper tissue impact".into()
                } else {
                    "Risk of infection".into()
                },
                "Requires immediate medical attention".into(),
            ],
        ),
        "fracture" => assessment(
            RiskLevel::High,
            "red",
            factors(&[
                "Possible bone fracture",
                "Immediate medical evaluation required",
                "Risk of displacement",
                "Potential complications if untreated",
            ]),
        ),
        "burn" if confidence > 0.75 => assessment(
            RiskLevel::High,
            "red",
            factors(&[
                "Thermal injury detected",
                "Burns require professional treatment",
                "Risk of infection",
                "Prevent complications and scarring",
            ]),
        ),
        _ if CRITICAL_KEYWORDS.iter().any(|k| notes.contains(k)) => assessment(
            RiskLevel::High,
            "red",
            factors(&[
                "Severity indicators detected",
                "Professional medical attention needed",
                "Potential complications present",
            ]),
        ),
        "cut" if !has_bleeding => assessment(
            RiskLevel::Medium,
            "yellow",
            factors(&["Minor laceration", "Monitor for infection signs", "Keep wound clean"]),
        ),
        "swelling" | "bruise" => assessment(
            RiskLevel::Medium,
            "yellow",
            vec![
                format!("{} detected", capitalize(injury_type)),
                "Monitor and seek care if worsening".into(),
                "Apply RICE method (Rest, Ice, Compression, Elevation)".into(),
            ],
        ),
        "burn" => assessment(
            RiskLevel::Medium,
            "yellow",
            factors(&[
                "Burn detected",
                "Professional evaluation recommended",
                "Prevent infection",
            ]),
        ),
        "rash" => assessment(
            RiskLevel::Medium,
            "yellow",
            factors(&[
                "Skin condition detected",
                "May require medical evaluation if persistent",
                "Monitor for worsening symptoms",
            ]),
        ),
        _ if confidence < 0.60 => assessment(
            RiskLevel::Medium,
            "yellow",
            factors(&[
                "Unclear injury pattern",
                "Medical evaluation recommended for proper assessment",
            ]),
        ),
        _ => assessment(
            RiskLevel::Low,
            "green",
            factors(&[
                "Minor injury detected",
                "Basic first aid recommended",
                "Monitor and seek care if symptoms worsen",
            ]),
        ),
    }
}

/// Map a risk level to a plain urgency phrase
pub fn urgency_for(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::High => "Seek medical attention immediately",
        RiskLevel::Medium => "Consult healthcare provider within 24 hours",
        RiskLevel::Low => "Monitor and apply basic first aid",
    }
}
