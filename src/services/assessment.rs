use rand::Rng;
use serde::{Deserialize, Serialize};
use crate::services::risk::RiskLevel;

/// Health Questionnaire Scorer
///
/// Linear sum of small integer weights over the questionnaire answers, cut into
/// three risk bands. Pattern "detection" is keyword co-occurrence over the answers.

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HealthAssessmentRequest {
    #[serde(default = "default_moderate")]
    pub pain_level: String,
    #[serde(default = "default_moderate")]
    pub swelling: String,
    #[serde(default = "default_duration")]
    pub duration: String,
    #[serde(default = "default_area")]
    pub affected_area: String,
    #[serde(default = "default_moderate")]
    pub movement_difficulty: String,
    #[serde(default = "default_no")]
    pub redness: String,
    #[serde(default = "default_no")]
    pub warmth: String,
    #[serde(default)]
    pub additional_notes: Option<String>,
}

fn default_moderate() -> String {
    "moderate".to_string()
}

fn default_duration() -> String {
    "1-2 days".to_string()
}

fn default_area() -> String {
    "unknown".to_string()
}

fn default_no() -> String {
    "no".to_string()
}

impl Default for HealthAssessmentRequest {
    fn default() -> Self {
        Self {
            pain_level: default_moderate(),
            swelling: default_moderate(),
            duration: default_duration(),
            affected_area: default_area(),
            movement_difficulty: default_moderate(),
            redness: default_no(),
            warmth: default_no(),
            additional_notes: None,
        }
    }
}

impl HealthAssessmentRequest {
    /// All answers lowercased and space-joined, in field order
    fn answer_text(&self) -> String {
        let mut parts = vec![
            self.pain_level.as_str(),
            self.swelling.as_str(),
            self.duration.as_str(),
            self.affected_area.as_str(),
            self.movement_difficulty.as_str(),
            self.redness.as_str(),
            self.warmth.as_str(),
        ];
        if let Some(notes) = &self.additional_notes {
            parts.push(notes.as_str());
        }
        parts.join(" ").to_lowercase()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PossibleCondition {
    pub name: String,
    pub probability: String,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct TreatmentGuidance {
    pub immediate_care: Vec<String>,
    pub medications: Vec<String>,
    pub activities: Vec<String>,
    pub warning_signs: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthAssessment {
    pub analysis_id: u32,
    pub risk_level: RiskLevel,
    pub risk_color: String,
    pub risk_score: u32,
    pub risk_factors: Vec<String>,
    pub urgency: String,
    pub possible_conditions: Vec<PossibleCondition>,
    pub detected_patterns: Vec<String>,
    pub recommendations: Vec<String>,
    pub treatment_guidance: TreatmentGuidance,
    pub affected_area: String,
    pub confidence_score: f64,
    pub timestamp: String,
    pub analysis_method: String,
    pub disclaimer: String,
}

pub const ANALYSIS_METHOD: &str = "Hybrid AI/ML + Rule-Based Medical Expert System";
pub const ASSESSMENT_DISCLAIMER: &str =
    "AI-generated assessment. Not a substitute for professional medical diagnosis.";

const INJURY_PATTERNS: &[(&str, &[&str])] = &[
    ("acute_trauma", &["sharp", "sudden", "severe", "recent", "accident"]),
    ("inflammation", &["swelling", "redness", "warmth", "throbbing"]),
    ("chronic_condition", &["persistent", "recurring", "weeks", "months"]),
    ("infection", &["fever", "pus", "hot", "red", "spreading"]),
];

fn pain_score(pain: &str) -> u32 {
    match pain {
        "mild" => 1,
        "moderate" => 2,
        "severe" => 4,
        _ => 2,
    }
}

fn swelling_score(swelling: &str) -> u32 {
    match swelling {
        "none" => 0,
        "mild" => 1,
        "moderate" => 2,
        "severe" => 3,
        _ => 1,
    }
}

fn duration_score(duration: &str) -> u32 {
    match duration {
        "less than 24 hours" | "1-2 days" => 1,
        "3-7 days" => 2,
        "1 week+" => 3,
        "2 weeks+" => 4,
        _ => 1,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

/// Sum the questionnaire weights and collect the factors that contributed
pub fn score(req: &HealthAssessmentRequest) -> (u32, Vec<String>) {
    let mut score = 0;
    let mut factors = Vec::new();

    score += pain_score(&req.pain_level);
    if req.pain_level == "severe" {
        factors.push("Severe pain reported - requires immediate attention".to_string());
    }

    score += swelling_score(&req.swelling);
    if matches!(req.swelling.as_str(), "moderate" | "severe") {
        factors.push(format!("{} swelling detected", capitalize(&req.swelling)));
    }

    score += duration_score(&req.duration);
    if req.duration.contains("2 weeks+") || req.duration.contains("1 week+") {
        factors.push("Prolonged symptoms - chronic condition possible".to_string());
    }

    if matches!(req.movement_difficulty.as_str(), "severe" | "unable") {
        score += 2;
        factors.push("Significant mobility impairment".to_string());
    }

    if req.redness == "yes" {
        score += 1;
        factors.push("Redness present - inflammation indicated".to_string());
    }
    if req.warmth == "yes" {
        score += 1;
        factors.push("Warmth detected - active inflammation".to_string());
    }

    (score, factors)
}

/// Risk band for a score: (level, color, urgency)
pub fn band(score: u32) -> (RiskLevel, &'static str, &'static str) {
    if score >= 8 {
        (RiskLevel::High, "red", "immediate")
    } else if score >= 5 {
        (RiskLevel::Medium, "orange", "same-day")
    } else {
        (RiskLevel::Low, "green", "routine")
    }
}

/// Patterns with at least two keyword hits; `general_injury` when none qualify
pub fn detect_patterns(req: &HealthAssessmentRequest) -> Vec<String> {
    let text = req.answer_text();
    let detected: Vec<String> = INJURY_PATTERNS
        .iter()
        .filter(|(_, keywords)| keywords.iter().filter(|k| text.contains(*k)).count() >= 2)
        .map(|(name, _)| name.to_string())
        .collect();

    if detected.is_empty() {
        vec!["general_injury".to_string()]
    } else {
        detected
    }
}

fn condition(name: &str, probability: &str, description: &str) -> PossibleCondition {
    PossibleCondition {
        name: name.to_string(),
        probability: probability.to_string(),
        description: description.to_string(),
    }
}

fn has(patterns: &[String], name: &str) -> bool {
    patterns.iter().any(|p| p == name)
}

pub fn possible_conditions(req: &HealthAssessmentRequest, patterns: &[String]) -> Vec<PossibleCondition> {
    let mut conditions = Vec::new();

    if has(patterns, "acute_trauma") {
        let probability = if req.pain_level == "severe" { "high" } else { "medium" };
        conditions.push(condition(
            "Acute Soft Tissue Injury",
            probability,
            "Injury to muscles, ligaments, or tendons",
        ));
    }
    if has(patterns, "inflammation") || matches!(req.swelling.as_str(), "moderate" | "severe") {
        conditions.push(condition(
            "Inflammatory Response",
            "high",
            "Active tissue inflammation requiring attention",
        ));
    }
    if has(patterns, "chronic_condition") {
        conditions.push(condition(
            "Chronic Musculoskeletal Condition",
            "medium",
            "Persistent condition requiring specialist evaluation",
        ));
    }
    if has(patterns, "infection") {
        conditions.push(condition(
            "Possible Infection",
            "medium",
            "Signs suggesting infectious process - urgent medical review needed",
        ));
    }
    if conditions.is_empty() {
        conditions.push(condition(
            "Minor Injury",
            "medium",
            "Common minor injury with standard healing process",
        ));
    }

    conditions
}

pub fn recommendations(area: &str, patterns: &[String], urgency: &str) -> Vec<String> {
    let mut recs: Vec<String> = match urgency {
        "immediate" => vec![
            "🚨 Seek immediate medical attention - visit emergency department".into(),
            "Do not delay treatment - severe symptoms detected".into(),
        ],
        "same-day" => vec![
            "📅 Schedule medical consultation within 24 hours".into(),
            "Monitor symptoms closely for any worsening".into(),
        ],
        _ => vec![
            "📋 Consider scheduling routine medical evaluation".into(),
            "Follow home care guidelines and monitor progress".into(),
        ],
    };

    if has(patterns, "inflammation") {
        recs.push("Apply cold compress for 15-20 minutes every 2-3 hours".into());
        recs.push("Elevate affected area to reduce swelling".into());
    }

    if area != "unknown" {
        recs.push(format!("Limit use of {} until medical evaluation", area));
        recs.push("Avoid activities that worsen symptoms".into());
    }

    recs.push("Document any changes in symptoms".into());
    recs.push("Stay hydrated and get adequate rest".into());
    recs
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn treatment_guidance(pain: &str, swelling: &str) -> TreatmentGuidance {
    let mut guidance = TreatmentGuidance::default();

    if matches!(swelling, "moderate" | "severe") {
        guidance.immediate_care = strings(&[
            "RICE protocol: Rest, Ice, Compression, Elevation",
            "Apply ice pack wrapped in cloth for 15-20 minutes",
            "Keep affected area elevated above heart level when possible",
        ]);
    }

    if matches!(pain, "moderate" | "severe") {
        guidance.medications = strings(&[
            "Over-the-counter pain relief may be considered (consult pharmacist)",
            "Follow dosage instructions carefully",
            "Take with food if recommended",
        ]);
    }

    guidance.activities = strings(&[
        "Avoid strenuous activities until symptoms improve",
        "Use supportive devices if recommended by healthcare provider",
        "Gentle range-of-motion exercises after initial 48 hours (if approved)",
    ]);

    guidance.warning_signs = strings(&[
        "Sudden increase in pain or swelling",
        "Fever above 100.4°F (38°C)",
        "Numbness or tingling that worsens",
        "Loss of function or inability to bear weight",
        "Signs of infection (increased redness, pus, warmth)",
        "Symptoms that don't improve after 48-72 hours",
    ]);

    guidance
}

/// Analyze a questionnaire submission
pub fn analyze_questionnaire(req: &HealthAssessmentRequest) -> HealthAssessment {
    let (risk_score, risk_factors) = score(req);
    let (risk_level, risk_color, urgency) = band(risk_score);
    let detected_patterns = detect_patterns(req);
    let confidence = (0.70 + f64::from(risk_score) * 0.03).min(0.95);

    HealthAssessment {
        analysis_id: rand::thread_rng().gen_range(10_000..=99_999),
        risk_level,
        risk_color: risk_color.to_string(),
        risk_score,
        risk_factors,
        urgency: urgency.to_string(),
        possible_conditions: possible_conditions(req, &detected_patterns),
        recommendations: recommendations(&req.affected_area, &detected_patterns, urgency),
        treatment_guidance: treatment_guidance(&req.pain_level, &req.swelling),
        detected_patterns,
        affected_area: req.affected_area.clone(),
        confidence_score: (confidence * 100.0).round() / 100.0,
        timestamp: chrono::Utc::now().to_rfc3339(),
        analysis_method: ANALYSIS_METHOD.to_string(),
        disclaimer: ASSESSMENT_DISCLAIMER.to_string(),
    }
}
