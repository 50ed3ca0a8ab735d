use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Health chat assistant: keyword intent matching over canned replies

const INTENTS: &[(&str, &[&str])] = &[
    ("pain_query", &["pain", "hurt", "ache", "sore", "painful"]),
    ("swelling_query", &["swelling", "swollen", "puffy", "inflammation", "inflamed"]),
    ("treatment_query", &["treat", "help", "what should", "how to", "remedy"]),
    ("symptom_check", &["symptoms", "signs", "indication", "showing"]),
    ("urgency_query", &["urgent", "emergency", "serious", "dangerous", "worried"]),
    ("medication_query", &["medicine", "medication", "drug", "pill", "tablet"]),
    ("greeting", &["hello", "hi", "hey", "greetings", "good morning", "good afternoon"]),
];

pub const GENERAL_INTENT: &str = "general_query";

const FALLBACK_RESPONSE: &str =
    "I understand your concern. Could you provide more details about your symptoms so I can assist you better?";

fn templates(intent: &str) -> &'static [&'static str] {
    match intent {
        "greeting" => &[
            "Hello! I'm your AI health assistant. I'm here to help you understand your symptoms and provide guidance. How can I assist you today?",
            "Hi there! I can help analyze your health concerns and provide recommendations. What would you like to know?",
            "Greetings! I'm designed to assist with health assessments. Feel free to describe your symptoms or ask any questions.",
        ],
        "pain_query" => &[
            "Pain is an important indicator. Can you describe your pain level (mild, moderate, or severe) and its nature (sharp, dull, throbbing)?",
            "I understand you're experiencing pain. To help better, could you tell me where it hurts and how long you've had this pain?",
            "Pain assessment is crucial. On a scale of 1-10, how would you rate your pain? Also, what makes it better or worse?",
        ],
        "swelling_query" => &[
            "Swelling often indicates inflammation. Is the swollen area warm to touch? How long has it been swollen?",
            "I can help assess swelling. Is it localized to one area or spreading? Are you experiencing any redness along with it?",
            "Swelling is an important symptom. Has it come on suddenly or gradually? Is there any associated pain?",
        ],
        "treatment_query" => &[
            "For immediate care, the RICE method is often recommended: Rest, Ice, Compression, and Elevation. However, proper medical evaluation is important.",
            "Treatment depends on the specific condition. Can you describe your symptoms in detail so I can provide more targeted guidance?",
            "I can suggest general care measures, but please remember this is not a substitute for professional medical advice. What specific concern would you like help with?",
        ],
        "urgency_query" => &[
            "If you're experiencing severe symptoms, difficulty breathing, chest pain, or any life-threatening condition, please call emergency services immediately (911).",
            "Certain symptoms require immediate attention. These include: severe bleeding, chest pain, difficulty breathing, severe head injury, or loss of consciousness. If any apply, seek emergency care immediately.",
            "Your safety is paramount. If you're unsure about the urgency, it's always better to err on the side of caution and seek immediate medical attention.",
        ],
        _ => &[],
    }
}

const ENTITY_BODY_PARTS: &[&str] = &[
    "knee", "ankle", "wrist", "elbow", "shoulder", "back", "neck", "head", "chest", "abdomen",
    "leg", "arm", "hand", "foot",
];

const ENTITY_SYMPTOMS: &[&str] = &["pain", "swelling", "redness", "bruise", "cut", "burn", "bleeding"];

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ChatEntities {
    pub body_parts: Vec<String>,
    pub symptoms: Vec<String>,
    pub intensity: Option<String>,
    pub duration: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatReply {
    pub response: String,
    pub intent: String,
    pub confidence: f64,
    pub follow_up_questions: Vec<String>,
    pub entities_detected: ChatEntities,
    pub timestamp: String,
    pub conversation_id: i64,
}

/// Highest keyword count wins; ties go to the intent listed first
pub fn detect_intent(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    let mut best: Option<(&'static str, usize)> = None;

    for (intent, keywords) in INTENTS {
        let hits = keywords.iter().filter(|k| lower.contains(*k)).count();
        if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
            best = Some((*intent, hits));
        }
    }

    best.map(|(intent, _)| intent).unwrap_or(GENERAL_INTENT)
}

/// Pick a reply for the intent, appending the prior assessment's risk level when known
pub fn compose_response<R: Rng + ?Sized>(
    intent: &str,
    context: Option<&serde_json::Value>,
    rng: &mut R,
) -> String {
    let mut response = templates(intent)
        .choose(rng)
        .copied()
        .unwrap_or(FALLBACK_RESPONSE)
        .to_string();

    let risk_level = context
        .and_then(|ctx| ctx.get("risk_level"))
        .filter(|v| !v.is_null())
        .map(|v| match v.as_str() {
            Some(s) => s.to_string(),
            None => v.to_string(),
        });

    if let Some(level) = risk_level {
        response.push_str(&format!(
            "\n\nBased on your previous assessment, your risk level was {}. ",
            level
        ));
        if level == "HIGH" {
            response.push_str("I strongly recommend seeking immediate medical attention.");
        }
    }

    response
}

fn mentions_any(text: &str, words: &[&str]) -> bool {
    words.iter().any(|w| text.contains(w))
}

fn mentioned(text: &str, words: &[&str]) -> Vec<String> {
    words.iter().filter(|w| text.contains(*w)).map(|w| w.to_string()).collect()
}

pub fn extract_entities(message: &str) -> ChatEntities {
    let lower = message.to_lowercase();

    let intensity = if mentions_any(&lower, &["severe", "extreme", "unbearable"]) {
        Some("severe")
    } else if mentions_any(&lower, &["moderate", "medium"]) {
        Some("moderate")
    } else if mentions_any(&lower, &["mild", "slight", "minor"]) {
        Some("mild")
    } else {
        None
    };

    let duration = if lower.contains("yesterday") {
        Some("1-2 days")
    } else if lower.contains("week") {
        Some("1 week+")
    } else {
        None
    };

    ChatEntities {
        body_parts: mentioned(&lower, ENTITY_BODY_PARTS),
        symptoms: mentioned(&lower, ENTITY_SYMPTOMS),
        intensity: intensity.map(String::from),
        duration: duration.map(String::from),
    }
}

/// At most two follow-up questions
pub fn follow_up_questions(intent: &str, entities: &ChatEntities) -> Vec<String> {
    let mut questions = Vec::new();

    if intent == "pain_query" && entities.intensity.is_none() {
        questions.push("How would you rate your pain: mild, moderate, or severe?".to_string());
    }
    if !entities.symptoms.is_empty() && entities.duration.is_none() {
        questions.push("How long have you been experiencing these symptoms?".to_string());
    }
    if !entities.body_parts.is_empty() && entities.symptoms.iter().any(|s| s == "swelling") {
        questions.push("Is the swollen area warm or red?".to_string());
    }
    if questions.is_empty() {
        questions.push("Is there anything else about your symptoms you'd like to share?".to_string());
    }

    questions.truncate(2);
    questions
}

/// Build a reply. `conversation_id` is left at 0 for the caller to fill in once persisted.
pub fn process_message(message: &str, context: Option<&serde_json::Value>) -> ChatReply {
    let mut rng = rand::thread_rng();
    let intent = detect_intent(message);
    let entities = extract_entities(message);
    let confidence: f64 = rng.gen_range(0.85..=0.95);

    ChatReply {
        response: compose_response(intent, context, &mut rng),
        intent: intent.to_string(),
        confidence: (confidence * 100.0).round() / 100.0,
        follow_up_questions: follow_up_questions(intent, &entities),
        entities_detected: entities,
        timestamp: chrono::Utc::now().to_rfc3339(),
        conversation_id: 0,
    }
}
