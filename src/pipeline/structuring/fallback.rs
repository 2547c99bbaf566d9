use std::collections::HashSet;

use super::extractors::{
    extract_dosage_strength, extract_dosing, extract_duration, extract_frequency_phrase,
    extract_quantity, extract_timing, title_case,
};
use super::lexicon::Lexicon;
use super::types::{defaults, FieldConfidence, MedicineCandidate, UNKNOWN_CATEGORY};

/// Field values read once from the whole text and copied onto every
/// keyword match. Free text rarely ties a dose to a specific medicine, so
/// this is an approximation when more than one medicine is mentioned.
#[derive(Debug, Clone, PartialEq)]
struct SharedFields {
    frequency: String,
    timing: String,
    duration: String,
    quantity: String,
    dosage: Option<String>,
}

impl SharedFields {
    fn from_text(text: &str) -> Self {
        let frequency = extract_dosing(text)
            .map(|d| d.frequency)
            .or_else(|| extract_frequency_phrase(text))
            .map(|f| f.as_str())
            .unwrap_or(defaults::FREQUENCY);

        Self {
            frequency: frequency.to_string(),
            timing: extract_timing(text)
                .map(|t| t.as_str())
                .unwrap_or(defaults::TIMING)
                .to_string(),
            duration: extract_duration(text).unwrap_or_else(|| defaults::DURATION.to_string()),
            quantity: extract_quantity(text).unwrap_or_else(|| defaults::QUANTITY.to_string()),
            dosage: extract_dosage_strength(text),
        }
    }
}

/// Scan unstructured text for known medicine names.
///
/// Every registry key found as a substring yields one candidate, in registry
/// order and at most once per key.
pub fn parse_keyword_fallback(text: &str, lexicon: &Lexicon) -> Vec<MedicineCandidate> {
    let lower = text.to_lowercase();
    let mut seen = HashSet::new();
    let matches: Vec<_> = lexicon
        .medicines()
        .iter()
        .filter(|entry| lower.contains(entry.name_key.as_str()))
        .filter(|entry| seen.insert(entry.name_key.as_str()))
        .collect();

    if matches.is_empty() {
        return vec![];
    }

    let shared = SharedFields::from_text(text);
    tracing::debug!(matches = matches.len(), "keyword fallback matched registry names");

    matches
        .into_iter()
        .map(|entry| MedicineCandidate {
            name: title_case(&entry.name_key),
            dosage: shared.dosage.clone(),
            pharmaceutical_form: entry.form.clone(),
            icon: entry.icon_or_default().to_string(),
            category: if entry.category.is_empty() {
                UNKNOWN_CATEGORY.to_string()
            } else {
                entry.category.clone()
            },
            frequency: shared.frequency.clone(),
            timing: Some(shared.timing.clone()),
            duration: shared.duration.clone(),
            quantity: shared.quantity.clone(),
            confidence: FieldConfidence::keyword_match(),
        })
        .collect()
}
