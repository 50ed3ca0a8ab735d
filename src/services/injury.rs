use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Injury Detection Stub
///
/// Rule-based simulation of an image classifier. There is no computer vision here:
/// the result is derived from the upload's filename and a digest of its bytes, so
/// the same image always yields the same analysis.

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InjuryAnalysis {
    pub injury_type: String,
    pub confidence: f64,
    pub visual_notes: String,
    pub visual_indicators: Vec<String>,
}

/// Colour/texture features simulated from the image digest
#[derive(Debug, Clone, Copy)]
struct ImageFeatures {
    purple_blue: bool,
    blood_pattern: bool,
    linear_pattern: bool,
    inflammation: bool,
}

impl ImageFeatures {
    fn from_seed(seed: u32) -> Self {
        Self {
            purple_blue: seed % 5 == 0,
            blood_pattern: seed % 7 < 4,
            linear_pattern: seed % 11 < 6,
            inflammation: seed % 13 < 8,
        }
    }
}

/// First four bytes of the SHA-256 digest, big-endian
pub fn image_seed(image: &[u8]) -> u32 {
    let digest = Sha256::digest(image);
    u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]])
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn indicators(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Analyze an uploaded image
pub fn analyze_injury(image: &[u8], filename: &str) -> InjuryAnalysis {
    let seed = image_seed(image);
    let features = ImageFeatures::from_seed(seed);
    let mut rng = StdRng::seed_from_u64(u64::from(seed));
    let name = filename.to_lowercase();

    let (injury_type, visual_indicators, (low, high)) =
        if contains_any(&name, &["cut", "wound", "laceration"])
            || (features.blood_pattern && features.linear_pattern)
        {
            (
                "cut",
                vec![
                    "Visible open wound".to_string(),
                    if features.blood_pattern {
                        "Active bleeding detected".to_string()
                    } else {
                        "Blood traces present".to_string()
                    },
                    if features.purple_blue {
                        "Surrounding bruising (purple/blue discoloration)".to_string()
                    } else {
                        "Clean wound edges".to_string()
                    },
                    if features.inflammation {
                        "Local swelling and redness".to_string()
                    } else {
                        "Minimal inflammation".to_string()
                    },
                ],
                (0.82, 0.92),
            )
        } else if contains_any(&name, &["burn", "scald", "thermal"]) {
            (
                "burn",
                indicators(&[
                    "Skin discoloration (redness)",
                    "Thermal damage pattern",
                    "Possible blistering",
                    "Tissue inflammation",
                ]),
                (0.70, 0.88),
            )
        } else if contains_any(&name, &["swell", "bump", "edema"]) {
            (
                "swelling",
                indicators(&[
                    "Tissue inflammation visible",
                    "Raised area detected",
                    "Possible fluid buildup",
                    "Skin stretching",
                ]),
                (0.68, 0.85),
            )
        } else if contains_any(&name, &["bruise", "contusion"]) || features.purple_blue {
            (
                "bruise",
                indicators(&[
                    "Purple-blue discoloration",
                    "Blunt force trauma pattern",
                    "Subcutaneous bleeding",
                    "No open wound",
                ]),
                (0.72, 0.88),
            )
        } else if contains_any(&name, &["fracture", "bone", "break"]) {
            (
                "fracture",
                indicators(&[
                    "Deformity detected",
                    "Significant swelling",
                    "Abnormal positioning",
                    "Possible bone displacement",
                ]),
                (0.75, 0.90),
            )
        } else if contains_any(&name, &["rash", "itch", "allergic"]) {
            (
                "rash",
                indicators(&[
                    "Skin irritation pattern",
                    "Red patches visible",
                    "Possible allergic reaction",
                    "Diffuse distribution",
                ]),
                (0.65, 0.82),
            )
        } else {
            // blood+linear and purple/blue are already claimed above
            (
                "swelling",
                indicators(&[
                    "Visual anomaly detected",
                    "Tissue irregularity",
                    "Requires medical evaluation",
                ]),
                (0.60, 0.75),
            )
        };

    let confidence = round2(rng.gen_range(low..=high));
    let visual_notes = format!(
        "Detected {}. Visual indicators: {}. AI analysis based on color patterns, texture analysis, and wound morphology.",
        injury_type.to_uppercase(),
        visual_indicators.join(", ")
    );

    InjuryAnalysis {
        injury_type: injury_type.to_string(),
        confidence,
        visual_notes,
        visual_indicators,
    }
}
