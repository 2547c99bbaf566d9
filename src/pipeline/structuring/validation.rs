// Review-time checks run on scanned candidates before the user confirms them.
// Flags fields that look implausible and snaps exact registry matches to the
// registry's form, icon and category.

use serde::{Deserialize, Serialize};

use super::lexicon::Lexicon;
use super::types::{MedicineCandidate, UNKNOWN_CATEGORY};

const DOSAGE_UNITS: &[&str] = &["mg", "mcg", "g", "ml", "iu"];

/// Frequencies the confirmation screen can schedule.
pub const SCHEDULABLE_FREQUENCIES: &[&str] = &[
    "Once daily",
    "Twice daily",
    "Three times daily",
    "Four times daily",
    "Once weekly",
    "As needed",
    "Every few hours",
];

/// A candidate plus per-field plausibility flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedMedicine {
    #[serde(flatten)]
    pub medicine: MedicineCandidate,
    pub name_valid: bool,
    pub dosage_valid: bool,
    pub frequency_valid: bool,
}

/// Validate candidates against the lexicon. Never fails; invalid fields are
/// flagged, not removed.
pub fn validate_candidates(
    candidates: Vec<MedicineCandidate>,
    lexicon: &Lexicon,
) -> Vec<ValidatedMedicine> {
    let validated: Vec<ValidatedMedicine> = candidates
        .into_iter()
        .map(|candidate| validate_candidate(candidate, lexicon))
        .collect();

    let flagged = validated
        .iter()
        .filter(|v| !(v.name_valid && v.dosage_valid && v.frequency_valid))
        .count();
    if flagged > 0 {
        tracing::debug!(
            total = validated.len(),
            flagged,
            "Scanned medicines need review"
        );
    }
    validated
}

fn validate_candidate(mut medicine: MedicineCandidate, lexicon: &Lexicon) -> ValidatedMedicine {
    let name_valid = match lexicon.lookup_exact(&medicine.name) {
        Some(entry) => {
            medicine.pharmaceutical_form = entry.form.clone();
            medicine.icon = entry.icon_or_default().to_string();
            medicine.category = if entry.category.is_empty() {
                UNKNOWN_CATEGORY.to_string()
            } else {
                entry.category.clone()
            };
            true
        }
        None => false,
    };

    let dosage_valid = medicine.dosage.as_deref().is_some_and(|dosage| {
        let lower = dosage.to_lowercase();
        DOSAGE_UNITS.iter().any(|unit| lower.contains(unit))
    });

    let frequency_valid = SCHEDULABLE_FREQUENCIES.contains(&medicine.frequency.as_str());

    ValidatedMedicine {
        medicine,
        name_valid,
        dosage_valid,
        frequency_valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::structuring::types::{icons, FieldConfidence, DEFAULT_FORM};

    fn candidate(name: &str, dosage: Option<&str>, frequency: &str) -> MedicineCandidate {
        MedicineCandidate {
            name: name.into(),
            dosage: dosage.map(str::to_string),
            pharmaceutical_form: DEFAULT_FORM.into(),
            icon: icons::PILL.into(),
            category: "unknown".into(),
            frequency: frequency.into(),
            timing: Some("After food".into()),
            duration: "7 Days".into(),
            quantity: "30 Tabs".into(),
            confidence: FieldConfidence::keyword_match(),
        }
    }

    fn validate(candidate: MedicineCandidate) -> ValidatedMedicine {
        validate_candidates(vec![candidate], Lexicon::builtin()).remove(0)
    }

    #[test]
    fn exact_registry_name_snaps_form_icon_category() {
        let v = validate(candidate("Omeprazole", Some("20 MG"), "Once daily"));
        assert!(v.name_valid);
        assert_eq!(v.medicine.pharmaceutical_form, "Capsule");
        assert_eq!(v.medicine.icon, "capsule");
        assert_eq!(v.medicine.category, "gi");
    }

    #[test]
    fn partial_name_is_not_valid() {
        let v = validate(candidate("Dolo 650", None, "Once daily"));
        assert!(!v.name_valid);
        assert_eq!(v.medicine.category, "unknown");
    }

    #[test]
    fn dosage_needs_a_unit() {
        assert!(validate(candidate("X", Some("500 MG"), "Once daily")).dosage_valid);
        assert!(validate(candidate("X", Some("2 IU"), "Once daily")).dosage_valid);
        assert!(!validate(candidate("X", Some("500"), "Once daily")).dosage_valid);
        assert!(!validate(candidate("X", Some(""), "Once daily")).dosage_valid);
        assert!(!validate(candidate("X", None, "Once daily")).dosage_valid);
    }

    #[test]
    fn frequency_must_be_schedulable() {
        assert!(validate(candidate("X", None, "As needed")).frequency_valid);
        assert!(validate(candidate("X", None, "Four times daily")).frequency_valid);
        assert!(!validate(candidate("X", None, "twice daily")).frequency_valid);
        assert!(!validate(candidate("X", None, "")).frequency_valid);
    }

    #[test]
    fn flags_serialize_next_to_candidate_fields() {
        let v = validate(candidate("Metformin", Some("500 MG"), "Twice daily"));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["name"], "Metformin");
        assert_eq!(json["type"], "Oral Tablet");
        assert_eq!(json["name_valid"], true);
        assert_eq!(json["dosage_valid"], true);
        assert_eq!(json["frequency_valid"], true);
    }

    #[test]
    fn order_and_count_preserved() {
        let out = validate_candidates(
            vec![
                candidate("Crocin", None, "Once daily"),
                candidate("Unknownium", None, "Weekly-ish"),
            ],
            Lexicon::builtin(),
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].medicine.name, "Crocin");
        assert!(out[0].name_valid);
        assert!(!out[1].name_valid);
        assert!(!out[1].frequency_valid);
    }
}
