use serde::{Deserialize, Serialize};

/// Form assigned when nothing in the text says otherwise.
pub const DEFAULT_FORM: &str = "Oral Tablet";

/// Category for medicines absent from the registry.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Defaults applied by the finalizer to fields the text never mentioned.
pub mod defaults {
    pub const FREQUENCY: &str = "Once daily";
    pub const TIMING: &str = "After food";
    pub const DURATION: &str = "7 Days";
    pub const QUANTITY: &str = "30 Tabs";
}

/// Icon tags understood by the medicine list UI.
pub mod icons {
    pub const PILL: &str = "pill";
    pub const CAPSULE: &str = "capsule";
    pub const SPRAY: &str = "spray";
    pub const NEEDLE: &str = "needle";
}

/// Daily frequency derived from a dosing code or an explicit phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DoseFrequency {
    OnceDaily,
    TwiceDaily,
    ThreeTimesDaily,
    FourTimesDaily,
}

impl DoseFrequency {
    /// Map a count of non-zero dosing slots to a frequency.
    /// Zero slots (an all-zero code) still reads as once daily.
    pub fn from_slot_count(count: usize) -> Self {
        match count {
            4 => Self::FourTimesDaily,
            3 => Self::ThreeTimesDaily,
            2 => Self::TwiceDaily,
            _ => Self::OnceDaily,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnceDaily => "Once daily",
            Self::TwiceDaily => "Twice daily",
            Self::ThreeTimesDaily => "Three times daily",
            Self::FourTimesDaily => "Four times daily",
        }
    }
}

/// When a dose is taken relative to meals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    BeforeFood,
    AfterFood,
    WithFood,
    EmptyStomach,
    LocalApplication,
}

impl Timing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BeforeFood => "Before food",
            Self::AfterFood => "After food",
            Self::WithFood => "With food",
            Self::EmptyStomach => "Empty stomach",
            Self::LocalApplication => "Local application",
        }
    }
}

/// Per-field confidence for one medicine candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldConfidence {
    pub name: f32,
    pub dosage: f32,
    pub frequency: f32,
    pub overall: f32,
}

impl FieldConfidence {
    /// Starting point for a numbered entry before its block is processed.
    pub fn structured(name: f32) -> Self {
        Self {
            name,
            dosage: 0.4,
            frequency: 0.4,
            overall: 0.6,
        }
    }

    /// Preset for medicines found by the whole-text registry scan.
    pub fn keyword_match() -> Self {
        Self {
            name: 0.9,
            dosage: 0.5,
            frequency: 0.7,
            overall: 0.7,
        }
    }

    /// Recompute `overall` as the average of the three field scores,
    /// rounded to two decimals.
    pub fn recompute_overall(&mut self) {
        let avg = (self.name + self.dosage + self.frequency) / 3.0;
        self.overall = round_to_hundredths(avg.clamp(0.0, 1.0));
    }
}

fn round_to_hundredths(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// One medicine mention recognized in a prescription transcription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineCandidate {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(rename = "type", alias = "pharmaceutical_form")]
    pub pharmaceutical_form: String,
    pub icon: String,
    pub category: String,
    /// Empty until a dosing code or phrase is found; never empty after finalize.
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub timing: Option<String>,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub quantity: String,
    pub confidence: FieldConfidence,
}

/// Output contract of a scan. `success` is always true: missing text or
/// missing medicines are reported through `message`, never as an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub success: bool,
    pub extracted_text: String,
    pub medicines: Vec<MedicineCandidate>,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ScanResult {
    pub fn with_medicines(extracted_text: &str, medicines: Vec<MedicineCandidate>) -> Self {
        Self {
            success: true,
            extracted_text: extracted_text.to_string(),
            count: medicines.len(),
            medicines,
            message: None,
        }
    }

    pub fn empty(extracted_text: &str, message: &str) -> Self {
        Self {
            success: true,
            extracted_text: extracted_text.to_string(),
            medicines: vec![],
            count: 0,
            message: Some(message.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_count_maps_to_frequency() {
        assert_eq!(DoseFrequency::from_slot_count(4), DoseFrequency::FourTimesDaily);
        assert_eq!(DoseFrequency::from_slot_count(3), DoseFrequency::ThreeTimesDaily);
        assert_eq!(DoseFrequency::from_slot_count(2), DoseFrequency::TwiceDaily);
        assert_eq!(DoseFrequency::from_slot_count(1), DoseFrequency::OnceDaily);
        assert_eq!(DoseFrequency::from_slot_count(0), DoseFrequency::OnceDaily);
    }

    #[test]
    fn overall_is_rounded_average() {
        let mut conf = FieldConfidence::structured(0.95);
        conf.recompute_overall();
        // (0.95 + 0.4 + 0.4) / 3 = 0.5833
        assert!((conf.overall - 0.58).abs() < 1e-6, "got {}", conf.overall);
    }

    #[test]
    fn keyword_preset_overall_is_consistent() {
        let mut conf = FieldConfidence::keyword_match();
        let preset = conf.overall;
        conf.recompute_overall();
        assert!((conf.overall - preset).abs() < 1e-6);
    }

    #[test]
    fn candidate_serializes_form_as_type() {
        let candidate = MedicineCandidate {
            name: "Dolo 650".into(),
            dosage: None,
            pharmaceutical_form: DEFAULT_FORM.into(),
            icon: icons::PILL.into(),
            category: "pain".into(),
            frequency: "Once daily".into(),
            timing: Some("After food".into()),
            duration: "5 Days".into(),
            quantity: "15 Tabs".into(),
            confidence: FieldConfidence::structured(0.95),
        };
        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["type"], "Oral Tablet");
        assert!(json.get("pharmaceutical_form").is_none());
    }

    #[test]
    fn candidate_accepts_pharmaceutical_form_key() {
        let json = r#"{
            "name": "Volini",
            "pharmaceutical_form": "Gel",
            "icon": "pill",
            "category": "pain",
            "confidence": {"name": 0.9, "dosage": 0.5, "frequency": 0.7, "overall": 0.7}
        }"#;
        let candidate: MedicineCandidate = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.pharmaceutical_form, "Gel");
        assert!(candidate.frequency.is_empty());
        assert!(candidate.timing.is_none());
    }

    #[test]
    fn scan_result_uses_camel_case_and_skips_absent_message() {
        let result = ScanResult::with_medicines("text", vec![]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["extractedText"], "text");
        assert!(json.get("message").is_none());

        let empty = ScanResult::empty("", "nothing");
        let json = serde_json::to_value(&empty).unwrap();
        assert_eq!(json["message"], "nothing");
        assert_eq!(json["count"], 0);
        assert_eq!(json["success"], true);
    }
}
